pub mod error;
pub mod models;
pub mod prelude;

/// Version of the snapshot model, written into log lines by the application
pub static LIB_VERSION: &str = env!("CARGO_PKG_VERSION");
