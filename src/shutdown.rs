//! Graceful shutdown handling with request draining.
//!
//! Every request owns a private engine connection for its whole lifetime, so
//! shutting down cleanly means waiting for in-flight requests to return
//! (and close their connections) before the process exits.

use crate::constants::{DEFAULT_DRAIN_TIMEOUT, DRAIN_POLL_INTERVAL};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Environment variable overriding the drain timeout, in seconds.
pub const DRAIN_TIMEOUT_ENV: &str = "TRINO_SHUTDOWN_DRAIN_TIMEOUT";

/// Counter of requests currently being served.
#[derive(Debug, Clone, Default)]
pub struct InFlightRequests {
    count: Arc<AtomicUsize>,
}

impl InFlightRequests {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request; it stays in flight until the guard is dropped.
    pub fn begin(&self) -> RequestGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        RequestGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Number of requests currently in flight.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Marks one request as in flight.
#[derive(Debug)]
pub struct RequestGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Shutdown signal that can be awaited.
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Wait for the shutdown signal.
    pub async fn recv(&mut self) {
        let _ = self.receiver.wait_for(|&v| v).await;
    }

    /// Check if shutdown has been signaled without blocking.
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Controller for managing graceful shutdown.
pub struct ShutdownController {
    sender: watch::Sender<bool>,
    shutting_down: AtomicBool,
    drain_timeout: Duration,
}

impl ShutdownController {
    /// Create a new shutdown controller with the default drain timeout.
    pub fn new() -> Self {
        Self::with_drain_timeout(DEFAULT_DRAIN_TIMEOUT)
    }

    /// Create a shutdown controller with a custom drain timeout.
    pub fn with_drain_timeout(drain_timeout: Duration) -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender,
            shutting_down: AtomicBool::new(false),
            drain_timeout,
        }
    }

    /// Get a shutdown signal receiver.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Check if shutdown is in progress.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Initiate shutdown. Only the first call has an effect.
    pub fn shutdown(&self) {
        if self
            .shutting_down
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Initiating graceful shutdown...");
            self.sender.send_replace(true);
        }
    }

    /// Signal shutdown and wait for in-flight requests, up to the drain timeout.
    ///
    /// Returns `true` when every request finished in time.
    pub async fn graceful_shutdown(&self, requests: &InFlightRequests) -> bool {
        self.shutdown();

        let start = Instant::now();
        loop {
            let running = requests.count();
            if running == 0 {
                info!("All requests drained");
                return true;
            }

            if start.elapsed() >= self.drain_timeout {
                warn!(
                    "Drain timeout exceeded with {} requests still running",
                    running
                );
                return false;
            }

            info!("Waiting for {} in-flight requests to complete...", running);
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    }

    /// Get the drain timeout.
    pub fn drain_timeout(&self) -> Duration {
        self.drain_timeout
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared shutdown controller type.
pub type SharedShutdownController = Arc<ShutdownController>;

/// Build a shared controller, honouring `TRINO_SHUTDOWN_DRAIN_TIMEOUT`.
pub fn shutdown_controller_from_env() -> SharedShutdownController {
    let drain_timeout = std::env::var(DRAIN_TIMEOUT_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_DRAIN_TIMEOUT);
    Arc::new(ShutdownController::with_drain_timeout(drain_timeout))
}

/// Install signal handlers for graceful shutdown.
///
/// Ctrl+C and, on Unix, SIGTERM trigger the controller.
pub async fn install_signal_handlers(controller: SharedShutdownController) {
    let ctrl_c_controller = controller.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating shutdown...");
                ctrl_c_controller.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C signal: {}", e);
            }
        }
    });

    #[cfg(unix)]
    {
        let term_controller = controller;
        tokio::spawn(async move {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    info!("Received SIGTERM, initiating shutdown...");
                    term_controller.shutdown();
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                }
            }
        });
    }
}
