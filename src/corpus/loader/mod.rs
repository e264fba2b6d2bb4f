#[cfg(test)]
mod tests;

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, info, warn};

use super::Document;
use crate::{RagError, Result};

/// Load every document with a recognised extension from `directory`.
///
/// Only the top level of the directory is scanned. A file that cannot be
/// read or parsed becomes a document with empty text rather than an error;
/// only a missing or unreadable directory fails the load. Documents are
/// returned sorted by file name.
#[inline]
pub fn load_documents(directory: &Path, extensions: &[String]) -> Result<Vec<Document>> {
    let corpus_error = |message: String| RagError::CorpusLoad {
        path: directory.display().to_string(),
        message,
    };

    if !directory.is_dir() {
        return Err(corpus_error(
            "directory does not exist or is not a directory".to_string(),
        ));
    }

    let entries = fs::read_dir(directory).map_err(|e| corpus_error(e.to_string()))?;

    let mut documents = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", directory.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(kind) = DocumentKind::from_path(&path, extensions) else {
            debug!("Ignoring {} (unrecognised extension)", path.display());
            continue;
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let text = kind.extract(&path);
        if text.trim().is_empty() {
            warn!("No text extracted from {}", name);
        } else {
            debug!("Extracted {} characters from {}", text.len(), name);
        }

        documents.push(Document { name, text });
    }

    documents.sort_by(|a, b| a.name.cmp(&b.name));

    info!(
        "Loaded {} documents from {}",
        documents.len(),
        directory.display()
    );
    Ok(documents)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    fn from_path(path: &Path, extensions: &[String]) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();

        let recognised = extensions
            .iter()
            .any(|ext| ext.trim().trim_start_matches('.').eq_ignore_ascii_case(&extension));
        if !recognised {
            return None;
        }

        if extension == "pdf" {
            Some(Self::Pdf)
        } else {
            Some(Self::PlainText)
        }
    }

    fn extract(self, path: &Path) -> String {
        match self {
            Self::Pdf => extract_pdf_pages(path).join("\n"),
            Self::PlainText => match fs::read(path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    String::new()
                }
            },
        }
    }
}

/// Extract the text of each page of a PDF.
///
/// The document is parsed once and every page is extracted on its own, so a
/// page that fails contributes an empty string and the remaining pages are
/// kept. A document that cannot be parsed at all yields no pages. The PDF
/// parser can panic on malformed input, which is treated the same as a
/// parse error.
fn extract_pdf_pages(path: &Path) -> Vec<String> {
    let loaded = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::Document::load(path)));

    let document = match loaded {
        Ok(Ok(document)) => document,
        Ok(Err(e)) => {
            warn!("Failed to parse PDF {}: {}", path.display(), e);
            return Vec::new();
        }
        Err(_) => {
            warn!("PDF parser panicked while reading {}", path.display());
            return Vec::new();
        }
    };

    let pages = document
        .get_pages()
        .into_keys()
        .map(|page| extract_pdf_page(&document, page, path))
        .collect::<Vec<_>>();
    debug!("Extracted {} pages from {}", pages.len(), path.display());
    pages
}

// Mirrors pdf_extract's private `extract_text_by_page` using its public API.
fn extract_text_by_page(
    document: &pdf_extract::Document,
    page: u32,
) -> std::result::Result<String, pdf_extract::OutputError> {
    let mut s = String::new();
    {
        let mut output = pdf_extract::PlainTextOutput::new(&mut s);
        pdf_extract::output_doc_page(document, &mut output, page)?;
    }
    Ok(s)
}

fn extract_pdf_page(document: &pdf_extract::Document, page: u32, path: &Path) -> String {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        extract_text_by_page(document, page)
    }));

    match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("Failed to extract page {} of {}: {}", page, path.display(), e);
            String::new()
        }
        Err(_) => {
            warn!("PDF parser panicked on page {} of {}", page, path.display());
            String::new()
        }
    }
}
