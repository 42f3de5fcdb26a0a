/*!
 * Controller lifecycle tests using the mock translator as backend
 */

use anyhow::Result;
use epubtr::app_config::Config;
use epubtr::app_controller::{BookOutcome, Controller};
use epubtr::providers::mock::MockTranslator;
use epubtr::translation::PairStatus;
use crate::common;

fn test_config(workspace: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.book.workspace_root = Some(workspace.to_path_buf());
    config
}

#[tokio::test]
async fn test_translateBook_withWorkingBackend_shouldWriteOutputNextToInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let book = common::create_test_epub(temp_dir.path(), "novel.epub", Some("Novel"), &["<p>Hello</p>"])?;
    let controller = Controller::with_config(test_config(&temp_dir.path().join("work")))?;

    let translator = MockTranslator::working();
    let outcome = controller
        .translate_book(&book, temp_dir.path(), false, &translator, &translator)
        .await?;

    let output = temp_dir.path().join("novel.fr.epub");
    assert_eq!(outcome, BookOutcome::Translated(output.clone()));
    let chapter = common::read_archive_entry(&output, "OEBPS/chapter01.xhtml")?;
    assert!(chapter.contains("<p>[fr] Hello</p>"));
    Ok(())
}

#[tokio::test]
async fn test_translateBook_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let book = common::create_test_epub(temp_dir.path(), "novel.epub", None, &["<p>Hello</p>"])?;
    common::create_test_file(&temp_dir.path().to_path_buf(), "novel.fr.epub", "old")?;
    let controller = Controller::with_config(test_config(&temp_dir.path().join("work")))?;

    let translator = MockTranslator::working();
    let skipped = controller
        .translate_book(&book, temp_dir.path(), false, &translator, &translator)
        .await?;
    assert_eq!(skipped, BookOutcome::Skipped);
    assert_eq!(translator.call_count(), 0);

    let forced = controller
        .translate_book(&book, temp_dir.path(), true, &translator, &translator)
        .await?;
    assert!(forced.output().is_some());
    assert_eq!(translator.call_count(), 1);
    assert!(common::archive_entry_names(&temp_dir.path().join("novel.fr.epub"))?.contains(&"mimetype".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_translateBook_withUnavailablePair_shouldFailWithoutOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let book = common::create_test_epub(temp_dir.path(), "novel.epub", None, &["<p>Hello</p>"])?;
    let controller = Controller::with_config(test_config(&temp_dir.path().join("work")))?;

    let translator = MockTranslator::working().with_pair_status(PairStatus::Unknown);
    let result = controller
        .translate_book(&book, temp_dir.path(), false, &translator, &translator)
        .await;

    assert!(result.is_err());
    assert_eq!(translator.call_count(), 0);
    assert!(!temp_dir.path().join("novel.fr.epub").exists());
    Ok(())
}

#[tokio::test]
async fn test_translateBook_withPairCheckDisabled_shouldIgnoreAvailability() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let book = common::create_test_epub(temp_dir.path(), "novel.epub", None, &["<p>Hello</p>"])?;
    let mut config = test_config(&temp_dir.path().join("work"));
    config.book.check_language_pair = false;
    let controller = Controller::with_config(config)?;

    let translator = MockTranslator::working().with_pair_status(PairStatus::Unsupported);
    let outcome = controller
        .translate_book(&book, temp_dir.path(), false, &translator, &translator)
        .await?;

    assert!(outcome.output().is_some());
    Ok(())
}

#[tokio::test]
async fn test_translateBook_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(test_config(&temp_dir.path().join("work")))?;
    let translator = MockTranslator::working();

    let result = controller
        .translate_book(&temp_dir.path().join("missing.epub"), temp_dir.path(), false, &translator, &translator)
        .await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_translateBook_withBatchingConfig_shouldSendFewerRequests() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let book = common::create_test_epub(
        temp_dir.path(),
        "novel.epub",
        None,
        &["<p>1</p><p>2</p><p>3</p><p>4</p><p>5</p>"],
    )?;
    let mut config = test_config(&temp_dir.path().join("work"));
    config.book.batch_paragraphs = true;
    config.book.batch_size = 3;
    let controller = Controller::with_config(config)?;

    let translator = MockTranslator::working();
    controller
        .translate_book(&book, temp_dir.path(), false, &translator, &translator)
        .await?;

    assert_eq!(translator.call_count(), 2);
    Ok(())
}

#[test]
fn test_translateBook_fromBlockingContext_shouldComplete() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let book = common::create_test_epub(temp_dir.path(), "novel.epub", Some("Novel"), &["<p>Hi</p>"])?;
    let controller = Controller::with_config(test_config(&temp_dir.path().join("work")))?;
    let translator = MockTranslator::identity();

    let result = tokio_test::block_on(async {
        controller
            .translate_book(&book, temp_dir.path(), false, &translator, &translator)
            .await
    })?;

    let output = result.output().expect("book should be translated");
    let chapter = common::read_archive_entry(output, "OEBPS/chapter01.xhtml")?;
    assert!(chapter.contains("<p>Hi</p>"));
    Ok(())
}

#[tokio::test]
async fn test_translateBook_whenInterrupted_shouldReportProgressAndWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let book = common::create_test_epub(temp_dir.path(), "novel.epub", None, &["<p>a</p><p>b</p><p>c</p>"])?;
    let controller = Controller::with_config(test_config(&temp_dir.path().join("work")))?;

    let translator = MockTranslator::working().with_stop_after(1, controller.interrupt_handle());
    let outcome = controller
        .translate_book(&book, temp_dir.path(), false, &translator, &translator)
        .await?;

    assert_eq!(outcome, BookOutcome::Interrupted { completed: 1, total: 3 });
    assert!(!temp_dir.path().join("novel.fr.epub").exists());
    Ok(())
}

#[tokio::test]
async fn test_translateFolder_withAllBooks_shouldTranslateEach() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_epub(temp_dir.path(), "a.epub", None, &["<p>one</p>"])?;
    common::create_test_epub(temp_dir.path(), "b.epub", None, &["<p>two</p>"])?;
    let controller = Controller::with_config(test_config(&temp_dir.path().join("work")))?;

    let translator = MockTranslator::working();
    let summary = controller
        .translate_folder(temp_dir.path(), false, &translator, &translator)
        .await?;

    assert_eq!(summary.translated, 2);
    assert!(!summary.interrupted);
    assert!(temp_dir.path().join("a.fr.epub").exists());
    assert!(temp_dir.path().join("b.fr.epub").exists());
    Ok(())
}

#[tokio::test]
async fn test_translateFolder_whenInterrupted_shouldNotStartRemainingBooks() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    for name in ["a.epub", "b.epub", "c.epub"] {
        common::create_test_epub(temp_dir.path(), name, None, &["<p>one</p><p>two</p>"])?;
    }
    let controller = Controller::with_config(test_config(&temp_dir.path().join("work")))?;

    let translator = MockTranslator::working().with_stop_after(1, controller.interrupt_handle());
    let summary = controller
        .translate_folder(temp_dir.path(), false, &translator, &translator)
        .await?;

    assert!(summary.interrupted);
    assert_eq!(summary.translated, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(translator.call_count(), 1);
    for name in ["a.fr.epub", "b.fr.epub", "c.fr.epub"] {
        assert!(!temp_dir.path().join(name).exists());
    }
    Ok(())
}
