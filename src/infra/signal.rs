//! Ctrl-C handling for long training runs.
//!
//! A listener thread waits for the interrupt and flips a shared
//! flag; the training loop polls the flag between batches.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared "please stop" flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Spawn a background thread that sets `stop` on the first Ctrl-C.
pub fn spawn_ctrl_c_listener(stop: StopSignal) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("Received Ctrl+C");
                        stop.request_stop();
                    }
                    Err(e) => tracing::warn!("Cannot listen for Ctrl+C: {}", e),
                }
            });
        })?;

    Ok(())
}
