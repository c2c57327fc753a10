//! Upload fixtures and the stand-in native converter.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use axum_test::multipart::Part;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Behaves like the office converter CLI: answers `--version`, honours
/// `--convert-to <ext>[:filter]` and `--outdir`, and writes `<outdir>/<stem>.<ext>`. Inputs
/// containing `FAIL` make it exit 1.
const FAKE_CONVERTER: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "FakeOffice 7.0"
  exit 0
fi
fmt=""
outdir=""
input=""
while [ $# -gt 0 ]; do
  case "$1" in
    --convert-to) fmt="${2%%:*}"; shift 2 ;;
    --outdir) outdir="$2"; shift 2 ;;
    --headless|-env:*) shift ;;
    *) input="$1"; shift ;;
  esac
done
if grep -q FAIL "$input"; then
  echo "Error: source file could not be loaded" >&2
  exit 1
fi
name=$(basename "$input")
stem="${name%.*}"
echo "converted $name to $fmt" > "$outdir/$stem.$fmt"
"#;

#[cfg(unix)]
pub fn install_fake_converter(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-soffice");
    std::fs::write(&path, FAKE_CONVERTER).expect("Failed to write fake converter");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake converter executable");
    path
}

/// Minimal DOCX: a zip holding `word/document.xml` with one paragraph per line.
pub fn create_test_docx(lines: &[&str]) -> Vec<u8> {
    let body: String = lines
        .iter()
        .map(|line| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", line))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
        body
    );

    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        zip.start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buffer
}

pub fn docx_part(name: &str, data: Vec<u8>) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name(name.to_string())
        .mime_type(DOCX_MIME)
}

pub fn text_part(name: &str, text: &str) -> Part {
    Part::bytes(bytes::Bytes::from(text.to_string()))
        .file_name(name.to_string())
        .mime_type("text/plain")
}

/// Sorted entry names of a zip archive.
pub fn archive_entries(data: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(data)).expect("Response is not a zip archive");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

pub fn archive_entry(data: &[u8], name: &str) -> String {
    use std::io::Read;

    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).expect("Response is not a zip archive");
    let mut entry = archive.by_name(name).expect("Missing archive entry");
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}
