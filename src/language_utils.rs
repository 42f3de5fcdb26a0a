use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// This module provides functions for validating, normalizing, and
/// matching ISO 639-1 (2-letter) and ISO 639-2 (3-letter) language codes,
/// plus the small subset of BCP 47 tag handling needed for book metadata
/// (`zh-Hant`, `pt-BR`, ...).
/// Language code type
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Script a language is written in when no script subtag is given
const LIKELY_SCRIPTS: &[(&str, &str)] = &[
    ("zh", "hans"),
    ("ja", "jpan"),
    ("ko", "kore"),
    ("ru", "cyrl"),
    ("uk", "cyrl"),
    ("bg", "cyrl"),
    ("sr", "cyrl"),
    ("ar", "arab"),
    ("fa", "arab"),
    ("he", "hebr"),
    ("hi", "deva"),
    ("th", "thai"),
    ("el", "grek"),
];

fn bibliographic_to_terminologic(code: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if bibliographic_to_terminologic(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = bibliographic_to_terminologic(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang.to_639_1().map(str::to_string).unwrap_or(part2t))
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Subtags of a language tag, split on `-` or `_`
struct TagParts<'a> {
    primary: &'a str,
    script: Option<&'a str>,
    region: Option<&'a str>,
}

fn split_tag(tag: &str) -> TagParts<'_> {
    let mut parts = tag.trim().split(['-', '_']);
    let primary = parts.next().unwrap_or_default();
    let mut script = None;
    let mut region = None;

    for part in parts {
        let is_script = part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic());
        let is_region = (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
            || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()));

        if is_script && script.is_none() && region.is_none() {
            script = Some(part);
        } else if is_region && region.is_none() {
            region = Some(part);
        }
    }

    TagParts { primary, script, region }
}

/// Validate a language tag whose primary subtag is an ISO 639 code
pub fn validate_language_tag(tag: &str) -> Result<()> {
    let parts = split_tag(tag);
    validate_language_code(parts.primary)
        .map(|_| ())
        .map_err(|_| anyhow!("Invalid language tag: {}", tag))
}

/// Shortest tag that still identifies the language, suitable for `dc:language`.
///
/// The primary subtag is reduced to ISO 639-1 where one exists, a script subtag
/// is dropped when it is the language's usual script, and the region is kept.
pub fn minimal_tag(tag: &str) -> Result<String> {
    let parts = split_tag(tag);
    let primary = normalize_to_part1_or_part2t(parts.primary)?;
    let mut result = primary.clone();

    if let Some(script) = parts.script {
        let script_lower = script.to_lowercase();
        let likely = LIKELY_SCRIPTS
            .iter()
            .find(|(lang, _)| *lang == primary)
            .map(|(_, s)| *s)
            .unwrap_or("latn");
        if script_lower != likely {
            let mut chars = script_lower.chars();
            if let Some(first) = chars.next() {
                result.push('-');
                result.push(first.to_ascii_uppercase());
                result.push_str(chars.as_str());
            }
        }
    }

    if let Some(region) = parts.region {
        result.push('-');
        result.push_str(&region.to_uppercase());
    }

    Ok(result)
}

/// Human-readable language description used in translation prompts
pub fn describe_language_tag(tag: &str) -> String {
    let parts = split_tag(tag);
    let Ok(name) = get_language_name(parts.primary) else {
        return tag.to_string();
    };

    match parts.script.map(|s| s.to_lowercase()).as_deref() {
        Some("hans") => format!("{} (Simplified)", name),
        Some("hant") => format!("{} (Traditional)", name),
        _ => match parts.region {
            Some(region) => format!("{} ({})", name, region.to_uppercase()),
            None => name,
        },
    }
}
