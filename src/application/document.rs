//! Reading and writing element documents
//!
//! Documents are TOML renderings of [`Element`]: `tag`, optional `attributes`
//! as `[key, value]` pairs, optional `text`, and `[[children]]` tables.

use std::path::Path;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::Element;

/// Parse a document from TOML text; `origin` names the source in errors.
pub fn parse_document(content: &str, origin: &str) -> ApplicationResult<Element> {
    toml::from_str(content).map_err(|e| ApplicationError::InvalidDocument {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

pub fn render_document(element: &Element) -> ApplicationResult<String> {
    toml::to_string(element).map_err(|e| ApplicationError::InvalidDocument {
        path: element.tag.clone(),
        message: format!("serialize: {e}"),
    })
}

#[instrument(level = "debug")]
pub fn load_document(path: &Path) -> ApplicationResult<Element> {
    let content = std::fs::read_to_string(path).with_path_context("read document", path)?;
    let element = parse_document(&content, &path.display().to_string())?;
    debug!(elements = element.size(), "loaded document");
    Ok(element)
}

#[instrument(level = "debug", skip(element))]
pub fn write_document(path: &Path, element: &Element) -> ApplicationResult<()> {
    let content = render_document(element)?;
    std::fs::write(path, content).with_path_context("write document", path)
}
