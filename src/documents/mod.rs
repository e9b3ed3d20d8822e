// Document ingestion: archive staging, PDF text extraction, text cleanup
// and file-name metadata.

pub mod archive;
pub mod cleaner;
pub mod extractor;
pub mod metadata;

use serde::Serialize;

use metadata::DocumentMetadata;

/// Which cleanup pass a run applies to extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningPolicy {
    /// Letters only, stop words removed, tokens lemmatized.
    Lemmatize,
    /// Digits removed and back matter (references etc.) cut off.
    TruncateBibliography,
}

impl CleaningPolicy {
    pub fn from_skip_bibliography(skip: bool) -> Self {
        if skip {
            CleaningPolicy::TruncateBibliography
        } else {
            CleaningPolicy::Lemmatize
        }
    }

    pub fn apply(self, raw: &str) -> String {
        match self {
            CleaningPolicy::Lemmatize => cleaner::preprocess(raw, true),
            CleaningPolicy::TruncateBibliography => cleaner::truncate_bibliography(raw),
        }
    }
}

/// A paper that made it into the corpus.
#[derive(Debug, Clone)]
pub struct CorpusDocument {
    pub file_name: String,
    pub cleaned_text: String,
    pub metadata: DocumentMetadata,
}

/// Ordered set of documents with non-empty cleaned text.
///
/// Order follows the archive walk order so row indices in the document-term
/// matrix and the doc-topic matrix line up with `documents`.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<CorpusDocument>,
}

impl Corpus {
    pub fn new(documents: Vec<CorpusDocument>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[CorpusDocument] {
        &self.documents
    }

    pub fn texts(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.cleaned_text.as_str()).collect()
    }

    pub fn years(&self) -> Vec<Option<i32>> {
        self.documents.iter().map(|d| d.metadata.year).collect()
    }

    pub fn metadata(&self) -> Vec<&DocumentMetadata> {
        self.documents.iter().map(|d| &d.metadata).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_selection() {
        assert_eq!(
            CleaningPolicy::from_skip_bibliography(true),
            CleaningPolicy::TruncateBibliography
        );
        assert_eq!(
            CleaningPolicy::from_skip_bibliography(false),
            CleaningPolicy::Lemmatize
        );
    }

    #[test]
    fn test_corpus_years_follow_document_order() {
        let corpus = Corpus::new(vec![
            CorpusDocument {
                file_name: "a.pdf".into(),
                cleaned_text: "alpha".into(),
                metadata: DocumentMetadata::parse("A - 1991 - One.pdf"),
            },
            CorpusDocument {
                file_name: "b.pdf".into(),
                cleaned_text: "beta".into(),
                metadata: DocumentMetadata::default(),
            },
        ]);
        assert_eq!(corpus.years(), vec![Some(1991), None]);
        assert_eq!(corpus.texts(), vec!["alpha", "beta"]);
    }
}
