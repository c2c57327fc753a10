use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docbatch_core::{AppError, ConversionResult};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Highest deflate level.
const COMPRESSION_LEVEL: i32 = 9;

/// Sanitize filename for archive entry to prevent path traversal.
/// Extracts only the base name (strips path components like `../`).
fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Zip every result under its base name into `archive_path`, then read the finished archive back.
///
/// The archive is fully written and closed before any byte is returned.
pub async fn package_zip(
    results: &[ConversionResult],
    archive_path: &Path,
) -> Result<Vec<u8>, AppError> {
    let entries: Vec<(PathBuf, String)> = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            (
                r.output_path.clone(),
                sanitize_archive_filename(&r.entry_name(), &format!("converted_{}", i + 1)),
            )
        })
        .collect();
    let path = archive_path.to_path_buf();

    tokio::task::spawn_blocking(move || write_zip(&entries, &path))
        .await
        .map_err(|e| AppError::Archive(format!("archive task aborted: {}", e)))?
        .map_err(|e| AppError::Archive(format!("{:#}", e)))?;

    let bytes = tokio::fs::read(archive_path)
        .await
        .map_err(|e| AppError::Archive(format!("Failed to read back archive: {}", e)))?;

    tracing::debug!(
        entries = results.len(),
        archive_bytes = bytes.len(),
        "Packaged conversion results"
    );
    Ok(bytes)
}

fn write_zip(entries: &[(PathBuf, String)], archive_path: &Path) -> Result<()> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create archive: {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
        .unix_permissions(0o644);

    for (source, entry_name) in entries {
        zip.start_file(entry_name.as_str(), options)
            .with_context(|| format!("Failed to add file to ZIP: {}", entry_name))?;
        let mut input = File::open(source)
            .with_context(|| format!("Failed to open converted file: {}", source.display()))?;
        std::io::copy(&mut input, &mut zip)
            .with_context(|| format!("Failed to write file data to ZIP: {}", entry_name))?;
    }

    let mut writer = zip.finish().context("Failed to finalize ZIP archive")?;
    writer.flush().context("Failed to flush ZIP archive")?;
    Ok(())
}
