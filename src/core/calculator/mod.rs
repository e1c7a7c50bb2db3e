pub mod timeline;
pub mod weekly;
