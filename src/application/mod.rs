//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and owns document I/O.

pub mod document;
pub mod error;
pub mod error_ext;
pub mod export;
pub mod services;

pub use document::{load_document, parse_document, render_document, write_document};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use export::{export_element, to_display_tree, DEFAULT_LABEL_ATTRIBUTE};
pub use services::LabeledTree;
