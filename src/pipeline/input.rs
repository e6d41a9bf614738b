//! Input resolution: validate a single PDF path, or list the PDFs in a
//! directory for batch mode.
//!
//! We check the PDF magic bytes (`%PDF`) before handing the path to pdfium
//! so callers get a meaningful error rather than an opaque load failure.

use crate::error::FootnoteError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Validate that `path` exists, is readable, and starts with `%PDF`.
pub fn resolve_local(path: &Path) -> Result<PathBuf, FootnoteError> {
    let path = path.to_path_buf();

    if !path.is_file() {
        return Err(FootnoteError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            let read = f.read(&mut magic).unwrap_or(0);
            if read < 4 || &magic != b"%PDF" {
                return Err(FootnoteError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(FootnoteError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(FootnoteError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Does the file name end in `.pdf`, in any case?
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Every `*.pdf` file directly inside `dir`, sorted by path. Subdirectories
/// are not searched.
pub fn collect_pdfs(dir: &Path) -> Result<Vec<PathBuf>, FootnoteError> {
    if !dir.exists() {
        return Err(FootnoteError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(FootnoteError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => FootnoteError::PermissionDenied {
            path: dir.to_path_buf(),
        },
        _ => FootnoteError::Internal(format!("Cannot list '{}': {}", dir.display(), e)),
    })?;

    let mut pdfs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_pdf_extension(p))
        .collect();
    pdfs.sort();

    if pdfs.is_empty() {
        warn!("No PDF files found in {}", dir.display());
    } else {
        debug!("Found {} PDF files in {}", pdfs.len(), dir.display());
    }
    Ok(pdfs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_has_pdf_extension() {
        assert!(has_pdf_extension(Path::new("a.pdf")));
        assert!(has_pdf_extension(Path::new("dir/B.PDF")));
        assert!(!has_pdf_extension(Path::new("a.pdf.txt")));
        assert!(!has_pdf_extension(Path::new("pdf")));
    }

    #[test]
    fn test_resolve_missing_file() {
        let err = resolve_local(Path::new("/nonexistent/x.pdf")).unwrap_err();
        assert!(matches!(err, FootnoteError::FileNotFound { .. }));
    }

    #[test]
    fn test_resolve_rejects_non_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"PK\x03\x04rest").unwrap();
        let err = resolve_local(&path).unwrap_err();
        assert!(matches!(err, FootnoteError::NotAPdf { magic, .. } if &magic == b"PK\x03\x04"));
    }

    #[test]
    fn test_resolve_accepts_pdf_magic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::write(&path, b"%PDF-1.7\n").unwrap();
        assert_eq!(resolve_local(&path).unwrap(), path);
    }

    #[test]
    fn test_collect_pdfs_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf"] {
            std::fs::write(dir.path().join(name), b"%PDF").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let found = collect_pdfs(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_collect_pdfs_rejects_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("x.pdf");
        std::fs::write(&file, b"%PDF").unwrap();
        assert!(matches!(
            collect_pdfs(&file),
            Err(FootnoteError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_page_selection_to_indices() {
        use crate::config::PageSelection;

        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(PageSelection::Set(vec![3, 1, 3]).to_indices(5), vec![0, 2]);
    }
}
