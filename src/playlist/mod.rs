//! Extended M3U playlist handling.
//!
//! - parser: text to entries, tolerant of malformed input
//! - serializer: entries back to text
//! - store: fatal-on-error load and atomic save of the curated file

pub mod parser;
pub mod serializer;
pub mod store;

pub use parser::{parse, HEADER};
pub use serializer::serialize;
pub use store::PlaylistFileError;
