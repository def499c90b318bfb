//! Connectivity probe.

use std::sync::atomic::{AtomicBool, Ordering};

/// Tells the offline store which branch of its policy to take.
pub trait Connectivity: Send + Sync {
    fn is_connected(&self) -> bool;
}

/// A connectivity state the application flips by hand, e.g. from platform
/// network callbacks.
#[derive(Debug)]
pub struct ConnectivityFlag(AtomicBool);

impl ConnectivityFlag {
    pub fn new(connected: bool) -> Self {
        Self(AtomicBool::new(connected))
    }

    pub fn set_connected(&self, connected: bool) {
        self.0.store(connected, Ordering::SeqCst);
    }
}

impl Default for ConnectivityFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_connected(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
