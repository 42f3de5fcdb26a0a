/*!
 * Tests for language utility functions
 */

use epubtr::language_utils::{
    describe_language_tag, get_language_name, minimal_tag, normalize_to_part2t, validate_language_code,
    validate_language_tag, LanguageCodeType,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldReturnCorrectType() {
    assert!(matches!(validate_language_code("en").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("fra").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B));
    assert!(matches!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1));

    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
}

/// Test normalization of language codes to ISO 639-2/T format
#[test]
fn test_normalize_to_part2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("FRE").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("deu").unwrap(), "deu");
    assert!(normalize_to_part2t("zz").is_err());
}

#[test]
fn test_get_language_name_withValidCode_shouldReturnEnglishName() {
    assert_eq!(get_language_name("es").unwrap(), "Spanish");
    assert!(get_language_name("123").is_err());
}

#[test]
fn test_minimalTag_forBookMetadata_shouldNormalizeTags() {
    assert_eq!(minimal_tag("en").unwrap(), "en");
    assert_eq!(minimal_tag("eng").unwrap(), "en");
    assert_eq!(minimal_tag("zh-Hans").unwrap(), "zh");
    assert_eq!(minimal_tag("zh_hant").unwrap(), "zh-Hant");
    assert_eq!(minimal_tag("fr-ca").unwrap(), "fr-CA");
}

#[test]
fn test_minimalTag_withEquivalentTags_shouldCompareEqual() {
    assert_eq!(minimal_tag("en").unwrap(), minimal_tag("eng").unwrap());
    assert_eq!(minimal_tag("zh").unwrap(), minimal_tag("zh-Hans").unwrap());
    assert_ne!(minimal_tag("zh-Hans").unwrap(), minimal_tag("zh-Hant").unwrap());
}

#[test]
fn test_validateLanguageTag_withTags_shouldCheckPrimarySubtag() {
    assert!(validate_language_tag("zh-Hans").is_ok());
    assert!(validate_language_tag("es-419").is_ok());
    assert!(validate_language_tag("").is_err());
    assert!(validate_language_tag("xx-Hans").is_err());
}

#[test]
fn test_describeLanguageTag_withUnknownTag_shouldReturnInput() {
    assert_eq!(describe_language_tag("zh-Hans"), "Chinese (Simplified)");
    assert_eq!(describe_language_tag("pt-BR"), "Portuguese (BR)");
    assert_eq!(describe_language_tag("klingon-x"), "klingon-x");
}
