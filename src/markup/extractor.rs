/*!
 * Text unit extraction from markup documents.
 *
 * Finds paragraph-like elements by exact tag name and returns their byte
 * spans together with a plain-text rendering of their content. Nested
 * elements of the same name are not supported: the first matching close tag
 * ends the unit.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use super::tokenizer::{TagKind, Tokenizer};

/// Number of paragraphs grouped into one unit when batching is enabled
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Separator between member texts of a batched unit
pub const BATCH_SEPARATOR: &str = "\n\n";

static LINE_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\b[^>]*>").unwrap());
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// What to extract and how to group it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Element names treated as paragraphs
    pub tags: Vec<String>,
    /// Group consecutive paragraphs into runs of this size
    pub batch_size: Option<usize>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            tags: vec!["p".to_string()],
            batch_size: None,
        }
    }
}

impl ExtractOptions {
    pub fn new(tags: Vec<String>, batch_size: Option<usize>) -> Self {
        Self { tags, batch_size }
    }

    /// Default paragraph tags with batching of `DEFAULT_BATCH_SIZE`
    pub fn batched() -> Self {
        Self {
            batch_size: Some(DEFAULT_BATCH_SIZE),
            ..Self::default()
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.eq_ignore_ascii_case(name))
    }
}

/// One extracted unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSpan {
    /// Byte range in the source document, opening tag through closing tag
    pub range: Range<usize>,
    /// Plain text of the content
    pub text: String,
    /// Number of elements covered (1 unless batched)
    pub members: usize,
}

/// Extract every paragraph element of `document`, in document order.
pub fn extract(document: &str, options: &ExtractOptions) -> Vec<ExtractedSpan> {
    let elements = find_elements(document, options);

    match options.batch_size {
        Some(size) if size > 1 => batch(document, elements, size),
        _ => elements
            .into_iter()
            .map(|(range, inner)| ExtractedSpan {
                text: to_plain_text(&document[inner]),
                range,
                members: 1,
            })
            .collect(),
    }
}

/// (outer range, inner range) of each matching element
fn find_elements(document: &str, options: &ExtractOptions) -> Vec<(Range<usize>, Range<usize>)> {
    let mut elements = Vec::new();
    let mut open: Option<(&str, Range<usize>)> = None;

    for tag in Tokenizer::new(document) {
        match open.take() {
            None => {
                if tag.kind == TagKind::Open && options.matches(tag.name) {
                    open = Some((tag.name, tag.range));
                }
            }
            Some((name, opening)) => {
                if tag.kind == TagKind::Close && tag.is_named(name) {
                    elements.push((opening.start..tag.range.end, opening.end..tag.range.start));
                } else {
                    open = Some((name, opening));
                }
            }
        }
    }

    elements
}

fn batch(document: &str, elements: Vec<(Range<usize>, Range<usize>)>, size: usize) -> Vec<ExtractedSpan> {
    elements
        .chunks(size)
        .filter_map(|run| {
            let first = run.first()?;
            let last = run.last()?;
            let text = run
                .iter()
                .map(|(_, inner)| to_plain_text(&document[inner.clone()]))
                .collect::<Vec<_>>()
                .join(BATCH_SEPARATOR);

            Some(ExtractedSpan {
                range: first.0.start..last.0.end,
                text,
                members: run.len(),
            })
        })
        .collect()
}

/// Plain text of an element's inner markup.
///
/// Line breaks become `\n`, other tags are dropped, non-breaking spaces become
/// regular spaces and the result is trimmed.
pub fn to_plain_text(inner: &str) -> String {
    let with_breaks = LINE_BREAK_REGEX.replace_all(inner, "\n");
    let stripped = TAG_REGEX.replace_all(&with_breaks, "");
    stripped.replace('\u{00A0}', " ").trim().to_string()
}
