pub mod catalog_entry;
pub use catalog_entry::*;

pub mod comic_detail;
pub use comic_detail::*;
