pub mod comic;
pub mod image;
pub mod snapshot;
