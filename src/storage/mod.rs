//! Storage: filename sanitation and the session document store

pub mod sanitize;
pub mod store;

pub use sanitize::sanitize;
pub use store::{DocumentStore, FileEntry};
