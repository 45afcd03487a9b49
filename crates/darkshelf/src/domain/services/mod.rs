pub mod comic;
pub mod image;
