pub use super::error::Error;
pub use super::models::*;
