/*!
 * Writes translated text back into the spans produced by extraction.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;

use super::tokenizer::{TagKind, Tokenizer};

static CHARACTER_REFERENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap());

/// Escape `<` and every `&` that does not start a character reference.
///
/// Translators return plain text; existing references such as `&amp;` pass
/// through unchanged.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for (i, c) in text.char_indices() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '&' if !CHARACTER_REFERENCE_REGEX.is_match(&text[i..]) => escaped.push_str("&amp;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Replace each span of `document` with its translated element.
///
/// Spans must come from extracting the same, unmodified document and must not
/// overlap. They are applied from the last to the first so earlier offsets stay
/// valid.
pub fn replace_spans(document: &str, mut substitutions: Vec<(Range<usize>, String)>) -> String {
    substitutions.sort_by(|a, b| b.0.start.cmp(&a.0.start));

    let mut result = document.to_string();
    for (range, replacement) in substitutions {
        let Some(original) = document.get(range.clone()) else {
            continue;
        };
        let element = rebuild_element(original, &replacement);
        result.replace_range(range, &element);
    }

    result
}

/// Element text with its content replaced, keeping the original opening tag.
///
/// Falls back to a bare `<p>` wrapper when `original` is not a single
/// `<tag ...>...</tag>` element.
pub fn rebuild_element(original: &str, replacement: &str) -> String {
    match split_element(original) {
        Some((opening, closing)) => format!("{opening}{replacement}{closing}"),
        None => format!("<p>{replacement}</p>"),
    }
}

/// Opening and closing tag text of an element spanning all of `text`
fn split_element(text: &str) -> Option<(&str, &str)> {
    let mut tags = Tokenizer::new(text);
    let opening = tags.next()?;
    if opening.kind != TagKind::Open || opening.range.start != 0 {
        return None;
    }

    let closing = tags
        .filter(|tag| tag.kind == TagKind::Close && tag.is_named(opening.name))
        .last()?;
    if closing.range.end != text.len() {
        return None;
    }

    Some((&text[opening.range], &text[closing.range]))
}
