pub mod progress;
#[cfg(unix)]
pub mod signal;
pub mod sync;
