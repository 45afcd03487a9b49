pub mod image;
pub mod sync;
