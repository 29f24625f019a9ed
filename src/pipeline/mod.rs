//! The concurrent poll pipeline: a bounded queue fed by a scheduler (or the
//! scanner driver), drained by a fixed-size worker pool, with
//! at-most-once-in-flight-per-target semantics and graceful shutdown.
//!
//! Workers never hold an owning reference to a `Server`; they resolve
//! `(host, port)` back to the Server through `HostList::upsert_server` on
//! demand, per the design note on back-references (index pairs, not
//! pointers).

pub mod scheduler;
pub mod worker;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::RwLock;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::model::HostList;

/// One queue capacity for both drivers, per the external interfaces.
pub const QUEUE_CAPACITY: usize = 4096;

pub type Target = (String, u16);
pub type Receiver = Arc<AsyncMutex<mpsc::Receiver<Target>>>;
pub type Sender = mpsc::Sender<Target>;

/// Every process-wide mutable singleton the pipeline needs, bundled into
/// one explicit value threaded through the scheduler, workers and drivers.
/// No globals.
#[derive(Clone)]
pub struct AppState {
    pub hosts: Arc<RwLock<HostList>>,
    pub running: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(hosts: HostList) -> Self {
        AppState {
            hosts: Arc::new(RwLock::new(hosts)),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn shut_down(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

pub fn bounded_channel() -> (Sender, Receiver) {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    (tx, Arc::new(AsyncMutex::new(rx)))
}

/// Enqueues `target`, retrying every 50ms while the queue is full, as the
/// scanner driver's backpressure policy specifies.
pub async fn enqueue_with_backpressure(sender: &Sender, target: Target) {
    let mut target = target;
    loop {
        match sender.try_send(target) {
            Ok(()) => return,
            Err(mpsc::error::TrySendError::Full(returned)) => {
                target = returned;
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            Err(mpsc::error::TrySendError::Closed(_)) => return,
        }
    }
}
