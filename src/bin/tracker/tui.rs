//! The live terminal view: a scrolling server list and an optional detail
//! pane, rendered with `ratatui`/`crossterm`. A collaborator of the core —
//! it only ever calls `HostList` iteration and mutation APIs already
//! exposed by the library.

use std::io::Stdout;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use eyre::Result;
use mcsentinel::{model::HostList, pipeline::AppState};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};

use crate::clipboard;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One row a user can select and copy. Dynamic dispatch on "property type"
/// without an inheritance hierarchy: a tagged variant, with per-variant
/// label and copy-as-text behavior.
#[derive(Debug, Clone)]
enum Row {
    Server { host: String, port: u16 },
    Field { label: String, value: String },
}

impl Row {
    fn label(&self) -> String {
        match self {
            Row::Server { host, port } => format!("{host}:{port}"),
            Row::Field { label, value } => format!("{label}: {value}"),
        }
    }

    fn copy_text(&self) -> String {
        match self {
            Row::Server { host, port } => format!("{{\"host\":\"{host}\",\"port\":{port}}}"),
            Row::Field { label, value } => format!("{{\"{label}\":\"{value}\"}}"),
        }
    }
}

enum View {
    List,
    Detail,
}

struct App {
    view: View,
    list_state: ListState,
    detail_state: ListState,
    selected_server: Option<(String, u16)>,
}

impl App {
    fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        App {
            view: View::List,
            list_state,
            detail_state: ListState::default(),
            selected_server: None,
        }
    }
}

/// Server rows sorted by active first, then by player count descending —
/// matching the TUI's documented sort order.
fn sorted_servers(hosts: &HostList) -> Vec<(String, u16, bool, usize)> {
    let mut rows: Vec<(String, u16, bool, usize)> = hosts
        .iter_servers()
        .map(|(address, server)| (address.to_string(), server.port, server.active, server.players.len()))
        .collect();
    rows.sort_by(|a, b| b.2.cmp(&a.2).then(b.3.cmp(&a.3)));
    rows
}

fn detail_rows(hosts: &HostList, host: &str, port: u16) -> Vec<Row> {
    let Some((_, server)) = hosts.iter_servers().find(|(a, s)| *a == host && s.port == port) else {
        return Vec::new();
    };

    let mut rows = vec![
        Row::Field { label: "active".into(), value: server.active.to_string() },
        Row::Field {
            label: "server_version".into(),
            value: server.server_version.clone().unwrap_or_default(),
        },
        Row::Field {
            label: "players".into(),
            value: format!("{}/{}", server.active_players, server.max_players),
        },
    ];
    for player in &server.players {
        rows.push(Row::Field {
            label: format!("player:{}", player.name),
            value: player.uuid.clone(),
        });
    }
    for m in &server.mods {
        rows.push(Row::Field {
            label: format!("mod:{}", m.id),
            value: m.version.clone(),
        });
    }
    rows
}

pub async fn run(state: AppState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, state.clone()).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: AppState,
) -> Result<()> {
    let mut app = App::new();

    while state.is_running() {
        let server_rows = {
            let hosts = state.hosts.read();
            sorted_servers(&hosts)
        };

        terminal.draw(|frame| draw(frame, &mut app, &server_rows, &state))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            match app.view {
                View::List => match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => state.shut_down(),
                    KeyCode::Down => move_selection(&mut app.list_state, server_rows.len(), 1),
                    KeyCode::Up => move_selection(&mut app.list_state, server_rows.len(), -1),
                    KeyCode::PageDown => move_selection(&mut app.list_state, server_rows.len(), 10),
                    KeyCode::PageUp => move_selection(&mut app.list_state, server_rows.len(), -10),
                    KeyCode::Char('v') | KeyCode::Char('V') => {
                        if let Some(i) = app.list_state.selected() {
                            if let Some((host, port, _, _)) = server_rows.get(i) {
                                app.selected_server = Some((host.clone(), *port));
                                app.detail_state.select(Some(0));
                                app.view = View::Detail;
                            }
                        }
                    }
                    KeyCode::Char('c') | KeyCode::Char('C') => {
                        if let Some(i) = app.list_state.selected() {
                            if let Some((host, port, _, _)) = server_rows.get(i) {
                                clipboard::copy(&Row::Server { host: host.clone(), port: *port }.copy_text());
                            }
                        }
                    }
                    KeyCode::Delete => {
                        if let Some(i) = app.list_state.selected() {
                            if let Some((host, port, _, _)) = server_rows.get(i) {
                                remove_server(&state, host, *port);
                            }
                        }
                    }
                    _ => {}
                },
                View::Detail => {
                    let rows = app
                        .selected_server
                        .as_ref()
                        .map(|(host, port)| detail_rows(&state.hosts.read(), host, *port))
                        .unwrap_or_default();
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => state.shut_down(),
                        KeyCode::Esc | KeyCode::Char('v') | KeyCode::Char('V') => app.view = View::List,
                        KeyCode::Down => move_selection(&mut app.detail_state, rows.len(), 1),
                        KeyCode::Up => move_selection(&mut app.detail_state, rows.len(), -1),
                        KeyCode::PageDown => move_selection(&mut app.detail_state, rows.len(), 10),
                        KeyCode::PageUp => move_selection(&mut app.detail_state, rows.len(), -10),
                        KeyCode::Char('c') | KeyCode::Char('C') => {
                            if let Some(i) = app.detail_state.selected() {
                                if let Some(row) = rows.get(i) {
                                    clipboard::copy(&row.copy_text());
                                }
                            }
                        }
                        KeyCode::Delete => {
                            if let Some(i) = app.detail_state.selected() {
                                if let (Some(Row::Field { label, .. }), Some((host, port))) =
                                    (rows.get(i), app.selected_server.as_ref())
                                {
                                    if let Some(name) = label.strip_prefix("player:") {
                                        remove_player(&state, host, *port, name);
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    Ok(())
}

fn move_selection(list_state: &mut ListState, len: usize, delta: i64) {
    if len == 0 {
        list_state.select(None);
        return;
    }
    let current = list_state.selected().unwrap_or(0) as i64;
    let next = (current + delta).clamp(0, len as i64 - 1);
    list_state.select(Some(next as usize));
}

fn remove_server(state: &AppState, host: &str, port: u16) {
    let mut hosts = state.hosts.write();
    for h in hosts.hosts_mut() {
        if h.address == host {
            h.servers.retain(|s| s.port != port);
        }
    }
}

fn remove_player(state: &AppState, host: &str, port: u16, name: &str) {
    let mut hosts = state.hosts.write();
    for h in hosts.hosts_mut() {
        if h.address == host {
            for s in &mut h.servers {
                if s.port == port {
                    s.players.retain(|p| p.name != name);
                }
            }
        }
    }
}

fn draw(
    frame: &mut ratatui::Frame,
    app: &mut App,
    server_rows: &[(String, u16, bool, usize)],
    state: &AppState,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    match app.view {
        View::List => {
            let items: Vec<ListItem> = server_rows
                .iter()
                .map(|(host, port, active, players)| {
                    let style = if *active {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    ListItem::new(Line::from(Span::styled(
                        format!("{host}:{port}  players={players}"),
                        style,
                    )))
                })
                .collect();

            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title("Servers"))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

            frame.render_stateful_widget(list, chunks[0], &mut app.list_state);
        }
        View::Detail => {
            let hosts = state.hosts.read();
            let rows = app
                .selected_server
                .as_ref()
                .map(|(host, port)| detail_rows(&hosts, host, *port))
                .unwrap_or_default();

            let items: Vec<ListItem> = rows.iter().map(|row| ListItem::new(row.label())).collect();
            let title = app
                .selected_server
                .as_ref()
                .map(|(h, p)| format!("Detail: {h}:{p}"))
                .unwrap_or_else(|| "Detail".to_string());

            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

            frame.render_stateful_widget(list, chunks[0], &mut app.detail_state);
        }
    }

    let stats = state.hosts.read().stats();
    let status = Paragraph::new(format!(
        "hosts={} servers={} active={} players={}  [↑/↓ move, V detail, C copy, Del remove, Q quit]",
        stats.hosts, stats.servers, stats.active_servers, stats.players
    ));
    frame.render_widget(status, chunks[1]);
}
