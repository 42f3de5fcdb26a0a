/*!
 * Common test utilities for the epubtr test suite
 */

use anyhow::Result;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Package document with an optional title and an `en` language
pub fn package_document(title: Option<&str>, chapter_count: usize) -> String {
    let title = title
        .map(|t| format!("    <dc:title>{}</dc:title>\n", t))
        .unwrap_or_default();
    let manifest: String = (1..=chapter_count)
        .map(|i| format!("    <item id=\"ch{i}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n", chapter_name(i)))
        .collect();
    let spine: String = (1..=chapter_count)
        .map(|i| format!("    <itemref idref=\"ch{i}\"/>\n"))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="uid">urn:uuid:0b6f7d1e-test</dc:identifier>
{title}    <dc:language>en</dc:language>
  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine>
{spine}  </spine>
</package>
"#
    )
}

/// Content document wrapping `body` markup
pub fn chapter_document(index: usize, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<html xmlns=\"http://www.w3.org/1999/xhtml\">\n<head><title>Chapter {}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        index, body
    )
}

pub fn chapter_name(index: usize) -> String {
    format!("chapter{:02}.xhtml", index)
}

/// Creates a minimal EPUB with one content document per entry of `chapters`.
///
/// Each chapter string is the body markup of its document. The title element
/// is omitted when `title` is `None`.
pub fn create_test_epub(dir: &Path, filename: &str, title: Option<&str>, chapters: &[&str]) -> Result<PathBuf> {
    let mut entries = vec![
        ("META-INF/container.xml".to_string(), CONTAINER_XML.to_string()),
        ("OEBPS/content.opf".to_string(), package_document(title, chapters.len())),
        ("OEBPS/style.css".to_string(), "p { margin: 0; }\n".to_string()),
    ];
    for (i, body) in chapters.iter().enumerate() {
        entries.push((format!("OEBPS/{}", chapter_name(i + 1)), chapter_document(i + 1, body)));
    }

    create_zip(dir, filename, &entries)
}

/// Creates an archive with a stored `mimetype` entry followed by `entries`
pub fn create_zip(dir: &Path, filename: &str, entries: &[(String, String)]) -> Result<PathBuf> {
    let entries: Vec<(String, Vec<u8>)> = entries
        .iter()
        .map(|(name, content)| (name.clone(), content.clone().into_bytes()))
        .collect();
    create_zip_bytes(dir, filename, &entries)
}

/// Same as `create_zip` with raw entry bytes
pub fn create_zip_bytes(dir: &Path, filename: &str, entries: &[(String, Vec<u8>)]) -> Result<PathBuf> {
    let path = dir.join(filename);
    let mut writer = ZipWriter::new(File::create(&path)?);

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("mimetype", stored)?;
    writer.write_all(b"application/epub+zip")?;

    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(name.as_str(), deflated)?;
        writer.write_all(content)?;
    }

    writer.finish()?;
    Ok(path)
}

/// Entry names of an archive, in archive order
pub fn archive_entry_names(path: &Path) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        names.push(archive.by_index(i)?.name().to_string());
    }
    Ok(names)
}

/// Text content of one archive entry
pub fn read_archive_entry(path: &Path, name: &str) -> Result<String> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut entry = archive.by_name(name)?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}

/// Raw bytes of one archive entry
pub fn read_archive_bytes(path: &Path, name: &str) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut entry = archive.by_name(name)?;
    let mut content = Vec::new();
    entry.read_to_end(&mut content)?;
    Ok(content)
}
