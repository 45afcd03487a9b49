use std::{fmt::Display, time::Duration};

/// What started a sync run, used for logging only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Startup,
    Signal,
    Periodic,
}

impl Display for SyncTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncTrigger::Startup => write!(f, "startup"),
            SyncTrigger::Signal => write!(f, "signal"),
            SyncTrigger::Periodic => write!(f, "periodic"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    /// Exclusive upper bound, ids `1..max_id` are dispatched
    pub max_id: u64,
    pub workers: usize,
    pub max_attempts: usize,
}

impl SyncSettings {
    pub fn total_jobs(&self) -> u64 {
        self.max_id.saturating_sub(1)
    }
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub dispatched: u64,
    pub collected: usize,
    pub elapsed: Duration,
}
