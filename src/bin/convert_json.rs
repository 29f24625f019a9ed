//! Exports a bincode snapshot as the human-readable JSON view described in
//! the external interfaces. Grounded in `original_source/convert_json.py`.

use std::path::PathBuf;

use clap::Parser;
use eyre::Result;
use mcsentinel::snapshot;

#[derive(Parser, Debug)]
#[command(name = "convert_json", about = "Export a snapshot file as JSON")]
struct Args {
    #[arg(short = 's', long, default_value = "save_state.bin")]
    state_file: PathBuf,

    #[arg(short = 'j', long, default_value = "save_state.json")]
    json_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let hosts = snapshot::load(&args.state_file)?;
    let export = snapshot::to_json_export(&hosts);
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(&args.json_file, json)?;

    println!(
        "wrote {} from {}",
        args.json_file.display(),
        args.state_file.display()
    );
    Ok(())
}
