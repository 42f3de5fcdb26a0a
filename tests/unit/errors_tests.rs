/*!
 * Tests for error types and conversions
 */

use epubtr::errors::{ArchiveError, ProviderError, SessionError, TranslationError, WorkspaceError};
use std::path::PathBuf;

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_translationError_fromProviderError_shouldWrap() {
    let error: TranslationError = ProviderError::ConnectionError("Host unreachable".to_string()).into();
    assert!(matches!(error, TranslationError::Provider(_)));
    assert!(format!("{}", error).contains("Host unreachable"));
}

#[test]
fn test_sessionError_invalidTransition_shouldNameActionAndState() {
    let error = SessionError::InvalidTransition {
        action: "resume",
        state: "ready",
    };
    assert_eq!(format!("{}", error), "Cannot resume while session is ready");
}

#[test]
fn test_sessionError_languagePairUnavailable_shouldNameBothLanguages() {
    let error = SessionError::LanguagePairUnavailable {
        source_language: "en".to_string(),
        target_language: "tlh".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("'en'"));
    assert!(display.contains("'tlh'"));
}

#[test]
fn test_sessionError_fromArchiveError_shouldWrap() {
    let error: SessionError = ArchiveError::UnsafeEntry("../evil.txt".to_string()).into();
    assert!(matches!(error, SessionError::Archive(ArchiveError::UnsafeEntry(_))));
    assert!(format!("{}", error).contains("../evil.txt"));
}

#[test]
fn test_workspaceError_unitCountMismatch_shouldShowCounts() {
    let error = WorkspaceError::UnitCountMismatch {
        path: PathBuf::from("OEBPS/ch1.xhtml"),
        expected: 4,
        found: 3,
    };
    let display = format!("{}", error);
    assert!(display.contains("expected 4 units, found 3"));
}
