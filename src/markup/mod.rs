/*!
 * Markup processing for content documents.
 *
 * - `tokenizer`: tag scanner shared by extraction and reinjection
 * - `extractor`: paragraph spans and their plain text
 * - `reinjector`: substitute translations back into those spans
 */

pub mod extractor;
pub mod reinjector;
pub mod tokenizer;

pub use self::extractor::{extract, ExtractOptions, ExtractedSpan};
pub use self::reinjector::{escape_text, replace_spans};
