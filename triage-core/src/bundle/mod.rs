//! Failure context bundles and the engine that builds them.

pub mod builder;
pub mod source_reader;
pub mod types;

pub use builder::ContextEngine;
pub use source_reader::SourceReader;
pub use types::{FailureContextBundle, RelatedSource};
