/*!
 * Archive codec for zip-based book containers.
 *
 * `unpack` explodes an archive into a directory, `repack` rebuilds an archive
 * from a directory. Files that nothing modified in between come back out
 * byte-identical.
 */

use log::{debug, warn};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::ArchiveError;

/// OCF requires this entry first and uncompressed when present
const MIMETYPE_ENTRY: &str = "mimetype";

/// Extract every entry of `archive_path` into `dest_dir`.
///
/// `dest_dir` is removed first if it exists. Returns the number of files written.
pub fn unpack(archive_path: &Path, dest_dir: &Path) -> Result<usize, ArchiveError> {
    if dest_dir.exists() {
        fs::remove_dir_all(dest_dir).map_err(|e| ArchiveError::io(dest_dir, e))?;
    }
    fs::create_dir_all(dest_dir).map_err(|e| ArchiveError::io(dest_dir, e))?;

    let file = File::open(archive_path).map_err(|e| ArchiveError::io(archive_path, e))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| ArchiveError::zip(archive_path, e))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ArchiveError::zip(archive_path, e))?;

        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ArchiveError::UnsafeEntry(entry.name().to_string()))?;
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }

        let mut out = File::create(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| ArchiveError::io(&out_path, e))?;
        written += 1;
    }

    debug!("Unpacked {} files from {:?} into {:?}", written, archive_path, dest_dir);
    Ok(written)
}

/// Build a new archive at `output_path` from every regular file under `source_dir`.
///
/// Entries are keyed by their `/`-separated path relative to `source_dir` and
/// added in sorted order. A root-level `mimetype` file goes first, stored.
/// Returns the number of entries written.
pub fn repack(source_dir: &Path, output_path: &Path) -> Result<usize, ArchiveError> {
    if !source_dir.is_dir() {
        return Err(ArchiveError::NotADirectory(source_dir.to_path_buf()));
    }

    if output_path.exists() {
        fs::remove_file(output_path).map_err(|e| ArchiveError::io(output_path, e))?;
    }

    let files = collect_files(source_dir)?;

    let out = File::create(output_path).map_err(|e| ArchiveError::io(output_path, e))?;
    let mut writer = ZipWriter::new(BufWriter::new(out));

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, path) in &files {
        let options = if name == MIMETYPE_ENTRY { stored } else { deflated };
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| ArchiveError::zip(output_path, e))?;

        let mut input = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
        io::copy(&mut input, &mut writer).map_err(|e| ArchiveError::io(path, e))?;
    }

    writer.finish().map_err(|e| ArchiveError::zip(output_path, e))?;

    debug!("Repacked {} files from {:?} into {:?}", files.len(), source_dir, output_path);
    Ok(files.len())
}

/// Regular files under `root` as (entry name, path), with `mimetype` first
fn collect_files(root: &Path) -> Result<Vec<(String, PathBuf)>, ArchiveError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            ArchiveError::io(path, io::Error::other(e.to_string()))
        })?;

        if !entry.file_type().is_file() {
            if entry.file_type().is_symlink() {
                warn!("Skipping symlink in workspace: {:?}", entry.path());
            }
            continue;
        }

        let Some(name) = entry_name(root, entry.path()) else {
            warn!("Skipping file with non UTF-8 path: {:?}", entry.path());
            continue;
        };

        files.push((name, entry.path().to_path_buf()));
    }

    if let Some(position) = files.iter().position(|(name, _)| name == MIMETYPE_ENTRY) {
        let mimetype = files.remove(position);
        files.insert(0, mimetype);
    }

    Ok(files)
}

fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
