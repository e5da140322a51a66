pub mod document;
pub mod table;

pub use document::{DocFormat, Document, DocumentMetadata};
pub use table::{Strategy, Table};
