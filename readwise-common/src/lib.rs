pub mod error;
pub mod model;
pub mod pagination;
pub mod readwise;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{Category, ExternalId, Highlight, HighlightRecord, Item, Tag};
pub use pagination::{ExportPage, ListPage, NextPage, Page, PageRequest};
pub use readwise::{ExportQuery, Readwise, Resource};
