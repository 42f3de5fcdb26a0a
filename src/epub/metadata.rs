/*!
 * Package document lookup and metadata field rewriting.
 *
 * Only the first matching element of each field is ever read or written.
 * Everything outside that element's inner text is left byte-for-byte intact.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::WorkspaceError;

/// Location of the container descriptor inside an unpacked book
pub const CONTAINER_DESCRIPTOR: &str = "META-INF/container.xml";

static FULL_PATH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)full-path\s*=\s*"([^"]*)""#).unwrap());

static TITLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)(<dc:title\b[^>]*>)(.*?)(</dc:title\s*>)").unwrap());

static LANGUAGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)(<dc:language\b[^>]*>)(.*?)(</dc:language\s*>)").unwrap());

static METADATA_OPEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<metadata\b[^>]*>").unwrap());

/// Metadata fields the pipeline touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Title,
    Language,
}

impl MetadataField {
    /// Qualified element name in the package document
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Title => "dc:title",
            Self::Language => "dc:language",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            Self::Title => &TITLE_REGEX,
            Self::Language => &LANGUAGE_REGEX,
        }
    }
}

/// Resolve the package document of an unpacked book.
///
/// Returns `None` when the container descriptor is missing or unreadable, or
/// carries no `full-path` attribute.
pub fn locate_package_document(root: &Path) -> Option<PathBuf> {
    let descriptor = root.join(CONTAINER_DESCRIPTOR);
    let content = match fs::read_to_string(&descriptor) {
        Ok(content) => content,
        Err(e) => {
            debug!("Cannot read container descriptor {:?}: {}", descriptor, e);
            return None;
        }
    };

    let relative = FULL_PATH_REGEX.captures(&content)?.get(1)?.as_str().trim();
    if relative.is_empty() {
        return None;
    }

    Some(root.join(relative))
}

/// Trimmed inner text of the first element matching `field`
pub fn read_field(document: &str, field: MetadataField) -> Option<String> {
    field
        .regex()
        .captures(document)
        .and_then(|caps| caps.get(2))
        .map(|inner| inner.as_str().trim().to_string())
}

/// Set the first `field` element's inner text to `value`.
///
/// When no such element exists, a new one is inserted right after the opening
/// `<metadata>` tag. Without a metadata section the document is returned as is.
pub fn write_field(document: &str, field: MetadataField, value: &str) -> String {
    if let Some(caps) = field.regex().captures(document) {
        // group 2 always participates when the whole pattern matched
        if let Some(inner) = caps.get(2) {
            let mut result = String::with_capacity(document.len() + value.len());
            result.push_str(&document[..inner.start()]);
            result.push_str(value);
            result.push_str(&document[inner.end()..]);
            return result;
        }
    }

    if let Some(open) = METADATA_OPEN_REGEX.find(document) {
        let element = field.element_name();
        let insertion = format!("\n<{element}>{value}</{element}>");
        let mut result = String::with_capacity(document.len() + insertion.len());
        result.push_str(&document[..open.end()]);
        result.push_str(&insertion);
        result.push_str(&document[open.end()..]);
        return result;
    }

    debug!("No metadata section found, {} left unchanged", field.element_name());
    document.to_string()
}

/// Apply [`write_field`] to the package document at `path`
pub fn write_field_to_file(path: &Path, field: MetadataField, value: &str) -> Result<(), WorkspaceError> {
    let document = fs::read_to_string(path).map_err(|source| WorkspaceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let updated = write_field(&document, field, value);
    if updated == document {
        return Ok(());
    }

    fs::write(path, updated).map_err(|source| WorkspaceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
