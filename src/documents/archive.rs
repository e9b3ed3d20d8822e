// Request-scoped staging of an uploaded archive.
//
// The upload is written to a temp file and its PDF entries unpacked into a
// temp directory. Both live exactly as long as the `StagingArea` value, so
// they're removed on every exit path (success, error, panic, cancellation).

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile, TempDir};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::AnalysisError;

/// Temporary on-disk copy of one upload and its extracted PDFs.
pub struct StagingArea {
    archive: NamedTempFile,
    extracted: TempDir,
    pdf_count: usize,
}

impl StagingArea {
    /// Stage an uploaded archive under the system temp directory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AnalysisError> {
        Self::from_bytes_in(bytes, &std::env::temp_dir())
    }

    /// Stage an uploaded archive under `parent`. Non-PDF entries are ignored.
    pub fn from_bytes_in(bytes: &[u8], parent: &Path) -> Result<Self, AnalysisError> {
        if bytes.is_empty() {
            return Err(AnalysisError::EmptyArchive);
        }

        let mut archive = Builder::new()
            .prefix("topiclens-upload-")
            .suffix(".zip")
            .tempfile_in(parent)?;
        archive.write_all(bytes)?;
        archive.flush()?;

        let mut staging = Self {
            archive,
            extracted: Builder::new().prefix("topiclens-pdfs-").tempdir_in(parent)?,
            pdf_count: 0,
        };
        staging.pdf_count = staging.unpack()?;
        debug!(
            pdfs = staging.pdf_count,
            dir = %staging.extracted.path().display(),
            "Archive staged"
        );
        Ok(staging)
    }

    /// Stage an archive that already exists on disk (CLI input).
    pub fn from_path_in(path: &Path, parent: &Path) -> Result<Self, AnalysisError> {
        if !path.exists() {
            return Err(AnalysisError::NoInput);
        }
        let bytes = fs::read(path)?;
        Self::from_bytes_in(&bytes, parent)
    }

    /// Number of PDF entries unpacked from the archive.
    pub fn pdf_count(&self) -> usize {
        self.pdf_count
    }

    /// Directory holding the extracted PDFs.
    pub fn root(&self) -> &Path {
        self.extracted.path()
    }

    /// All staged PDFs in deterministic (sorted path) walk order.
    pub fn pdf_paths(&self) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        walk(self.extracted.path(), &mut paths)?;
        paths.sort();
        Ok(paths)
    }

    fn unpack(&self) -> Result<usize, AnalysisError> {
        let file = self.archive.reopen()?;
        let mut zip =
            ZipArchive::new(file).map_err(|e| AnalysisError::UnreadableArchive(e.to_string()))?;

        if zip.len() == 0 {
            return Err(AnalysisError::EmptyArchive);
        }

        let mut unpacked = 0;
        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .map_err(|e| AnalysisError::UnreadableArchive(e.to_string()))?;

            if entry.is_dir() {
                continue;
            }
            let Some(relative) = entry.enclosed_name() else {
                warn!(entry = entry.name(), "Skipping archive entry with unsafe path");
                continue;
            };
            if !is_pdf(&relative) {
                continue;
            }

            let target = self.extracted.path().join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            if let Err(e) = io::copy(&mut entry, &mut out) {
                warn!(entry = %relative.display(), error = %e, "Failed to unpack entry, skipping");
                drop(out);
                let _ = fs::remove_file(&target);
                continue;
            }
            unpacked += 1;
        }

        Ok(unpacked)
    }
}

fn is_pdf(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".pdf"))
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, out)?;
        } else if is_pdf(&path) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_only_pdfs_are_staged() {
        let bytes = build_zip(&[
            ("b.pdf", b"%PDF-1.4"),
            ("nested/a.pdf", b"%PDF-1.4"),
            ("readme.txt", b"ignore me"),
        ]);
        let staging = StagingArea::from_bytes(&bytes).unwrap();
        assert_eq!(staging.pdf_count(), 2);

        let names: Vec<String> = staging
            .pdf_paths()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.pdf", "a.pdf"]);
    }

    #[test]
    fn test_staging_removed_on_drop() {
        let bytes = build_zip(&[("a.pdf", b"%PDF-1.4")]);
        let staging = StagingArea::from_bytes(&bytes).unwrap();
        let root = staging.root().to_path_buf();
        assert!(root.exists());
        drop(staging);
        assert!(!root.exists());
    }

    #[test]
    fn test_staging_lives_under_parent() {
        let parent = TempDir::new().unwrap();
        let bytes = build_zip(&[("a.pdf", b"%PDF-1.4")]);
        let staging = StagingArea::from_bytes_in(&bytes, parent.path()).unwrap();
        assert!(staging.root().starts_with(parent.path()));
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 2);
        drop(staging);
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_garbage_archive_is_unreadable() {
        let result = StagingArea::from_bytes(b"definitely not a zip file");
        assert!(matches!(result, Err(AnalysisError::UnreadableArchive(_))));
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        assert!(matches!(
            StagingArea::from_bytes(&[]),
            Err(AnalysisError::EmptyArchive)
        ));
    }
}
