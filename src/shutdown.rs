//! Interrupt flag shared by the signal handler and the dispatch loop.
//!
//! The handler only stores `true`; the loop polls the flag between
//! accept/read slices and tears down when it is set.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Route SIGINT / SIGTERM into this flag. Can only be installed once
    /// per process.
    pub fn install_interrupt_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            if flag.is_requested() {
                warn!("Second interrupt received, still shutting down");
            } else {
                info!("Interrupt received, shutting down");
            }
            flag.request();
        })
    }
}
