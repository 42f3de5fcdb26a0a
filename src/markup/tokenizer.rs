/*!
 * Minimal markup tag scanner.
 *
 * Yields opening and closing tags with their byte ranges. Comments, CDATA
 * sections, processing instructions and declarations are skipped whole, and
 * quoted attribute values may contain `>`. Text between tags is not reported.
 */

use std::ops::Range;

/// Kind of a scanned tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    SelfClosing,
    Close,
}

/// A tag found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub kind: TagKind,
    pub name: &'a str,
    /// From `<` to the byte after `>`
    pub range: Range<usize>,
}

impl Tag<'_> {
    /// Case-insensitive tag name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Iterator over the tags of a document
pub struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    /// Position right after `terminator` searched from `from`, or end of input
    fn skip_past(&self, from: usize, terminator: &str) -> usize {
        self.source[from..]
            .find(terminator)
            .map(|offset| from + offset + terminator.len())
            .unwrap_or(self.source.len())
    }

    fn name_end(&self, from: usize) -> usize {
        let bytes = self.bytes();
        let mut i = from;
        while i < bytes.len() && is_name_byte(bytes[i]) {
            i += 1;
        }
        i
    }

    /// Position after the `>` closing a tag, honoring quoted attribute values.
    /// Returns the end position and whether the tag was self-closing.
    fn tag_end(&self, from: usize) -> Option<(usize, bool)> {
        let bytes = self.bytes();
        let mut quote: Option<u8> = None;
        let mut last_significant = 0u8;
        let mut i = from;

        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'>' => return Some((i + 1, last_significant == b'/')),
                    _ => {}
                },
            }
            if quote.is_none() && !b.is_ascii_whitespace() {
                last_significant = b;
            }
            i += 1;
        }

        None
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'-' | b'_' | b'.')
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let source = self.source;
        let bytes = self.bytes();

        while self.pos < bytes.len() {
            let offset = source[self.pos..].find('<')?;
            let start = self.pos + offset;
            let rest = &source[start..];

            if rest.starts_with("<!--") {
                self.pos = self.skip_past(start + 4, "-->");
                continue;
            }
            if rest.starts_with("<![CDATA[") {
                self.pos = self.skip_past(start + 9, "]]>");
                continue;
            }
            if rest.starts_with("<?") {
                self.pos = self.skip_past(start + 2, "?>");
                continue;
            }
            if rest.starts_with("<!") {
                self.pos = self.skip_past(start + 2, ">");
                continue;
            }

            let (closing, name_start) = if rest.starts_with("</") {
                (true, start + 2)
            } else {
                (false, start + 1)
            };

            let starts_with_letter = bytes
                .get(name_start)
                .map(|b| b.is_ascii_alphabetic())
                .unwrap_or(false);
            if !starts_with_letter {
                // stray `<` in text
                self.pos = start + 1;
                continue;
            }

            let name_end = self.name_end(name_start);
            let Some((end, self_closing)) = self.tag_end(name_end) else {
                self.pos = bytes.len();
                return None;
            };
            self.pos = end;

            let kind = match (closing, self_closing) {
                (true, _) => TagKind::Close,
                (false, true) => TagKind::SelfClosing,
                (false, false) => TagKind::Open,
            };

            return Some(Tag {
                kind,
                name: &source[name_start..name_end],
                range: start..end,
            });
        }

        None
    }
}
