//! Expiry Sweeper Task
//!
//! Background loop that periodically runs a sweep pass until stopped.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{CacheError, Result};

/// Name given to the dedicated sweeper thread.
pub const SWEEPER_THREAD_NAME: &str = "local-cache-sweeper";

// == Sweeper Handle ==
/// Handle to a running sweeper.
///
/// Calling `stop` or dropping the handle ends the loop at its next wake-up.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: SweeperTask,
}

#[derive(Debug)]
enum SweeperTask {
    Runtime(JoinHandle<()>),
    Thread(thread::JoinHandle<()>),
}

impl SweeperHandle {
    /// Signals the sweeper to stop. Idempotent.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    /// Returns true once the sweep loop has exited.
    pub fn is_finished(&self) -> bool {
        match &self.task {
            SweeperTask::Runtime(handle) => handle.is_finished(),
            SweeperTask::Thread(handle) => handle.is_finished(),
        }
    }
}

/// Spawns the sweep loop on the current tokio runtime.
///
/// `pass` runs once per `interval`, after the first sleep, and returns the
/// number of evicted entries. A panicking pass is logged and the loop keeps
/// going. The pass runs inline on a runtime worker, and the task ends
/// when the runtime shuts down.
///
/// # Panics
/// Panics if called outside a tokio runtime, like `tokio::spawn`.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweeper(Duration::from_secs(120), move || engine.sweep_expired(Instant::now()));
/// // Later, during shutdown:
/// handle.stop();
/// ```
pub fn spawn_sweeper<F>(interval: Duration, pass: F) -> SweeperHandle
where
    F: Fn() -> usize + Send + 'static,
{
    let (shutdown, signal) = watch::channel(false);
    let task = tokio::spawn(run_sweeper(interval, pass, signal));

    SweeperHandle {
        shutdown,
        task: SweeperTask::Runtime(task),
    }
}

/// Spawns the sweep loop on its own OS thread driving a current-thread
/// tokio runtime, so it outlives any runtime the caller may be using.
pub fn spawn_dedicated_sweeper<F>(interval: Duration, pass: F) -> Result<SweeperHandle>
where
    F: Fn() -> usize + Send + 'static,
{
    let (shutdown, signal) = watch::channel(false);

    let task = thread::Builder::new()
        .name(SWEEPER_THREAD_NAME.to_string())
        .spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build();
            match runtime {
                Ok(runtime) => runtime.block_on(run_sweeper(interval, pass, signal)),
                Err(err) => error!("Failed to build sweeper runtime: {}", err),
            }
        })
        .map_err(|err| CacheError::Sweeper(err.to_string()))?;

    Ok(SweeperHandle {
        shutdown,
        task: SweeperTask::Thread(task),
    })
}

async fn run_sweeper<F>(interval: Duration, pass: F, mut shutdown: watch::Receiver<bool>)
where
    F: Fn() -> usize,
{
    info!("Starting expiry sweeper with interval of {:?}", interval);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            // Err means the handle was dropped
            _ = shutdown.changed() => break,
        }

        match panic::catch_unwind(AssertUnwindSafe(&pass)) {
            Ok(0) => debug!("Expiry sweep: no expired entries found"),
            Ok(removed) => info!("Expiry sweep: removed {} expired entries", removed),
            Err(cause) => error!(
                "Expiry sweep panicked, retrying next interval: {}",
                panic_message(cause.as_ref())
            ),
        }
    }

    info!("Expiry sweeper stopped");
}

fn panic_message(cause: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = cause.downcast_ref::<&str>() {
        message
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
