/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use epubtr::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(&temp_dir.path().to_path_buf(), "book.epub", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));

    Ok(())
}

#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that generate_output_path creates the correct path
#[test]
fn test_generate_output_path_withValidInputs_shouldCreateCorrectPath() {
    let output_path = FileManager::generate_output_path(
        Path::new("/tmp/input/novel.epub"),
        Path::new("/tmp/output"),
        "zh-Hant",
        "epub",
    );

    assert_eq!(output_path, Path::new("/tmp/output/novel.zh-Hant.epub"));
}

#[test]
fn test_find_markup_files_withMixedTree_shouldReturnSortedContentDocuments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().to_path_buf();
    fs::create_dir_all(root.join("OEBPS/text"))?;

    common::create_test_file(&root, "OEBPS/text/b.xhtml", "<p>b</p>")?;
    common::create_test_file(&root, "OEBPS/text/a.XHTML", "<p>a</p>")?;
    common::create_test_file(&root, "OEBPS/nav.html", "<p>nav</p>")?;
    common::create_test_file(&root, "OEBPS/old.htm", "<p>old</p>")?;
    common::create_test_file(&root, "OEBPS/content.opf", "<package/>")?;
    common::create_test_file(&root, "OEBPS/style.css", "p {}")?;

    let files = FileManager::find_markup_files(&root)?;
    let relative: Vec<String> = files
        .iter()
        .map(|f| f.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(
        relative,
        vec!["OEBPS/nav.html", "OEBPS/old.htm", "OEBPS/text/a.XHTML", "OEBPS/text/b.xhtml"]
    );

    // Stable across calls
    assert_eq!(FileManager::find_markup_files(&root)?, files);

    Ok(())
}

#[test]
fn test_find_files_withExtension_shouldOnlyMatchThatExtension() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().to_path_buf();
    common::create_test_file(&root, "one.epub", "")?;
    common::create_test_file(&root, "two.EPUB", "")?;
    common::create_test_file(&root, "notes.txt", "")?;

    let files = FileManager::find_files(&root, "epub")?;
    assert_eq!(files.len(), 2);

    Ok(())
}
