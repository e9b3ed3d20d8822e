// Identifier lookup trait: matching a paper against an external registry.
//
// Lookups are best effort. Callers turn any error into an absent identifier,
// so implementations are free to fail loudly.

use anyhow::Result;
use async_trait::async_trait;

use crate::documents::metadata::DocumentMetadata;

/// What a registry search needs to know about one paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperQuery {
    pub title: String,
    pub first_author: String,
    pub year: i32,
}

impl PaperQuery {
    /// Build a query from file-name metadata. Papers missing a title, author
    /// or year can't be searched for and yield `None`.
    pub fn from_metadata(metadata: &DocumentMetadata) -> Option<Self> {
        Some(Self {
            title: metadata.title.clone().filter(|t| !t.is_empty())?,
            first_author: metadata.first_author()?.to_string(),
            year: metadata.year?,
        })
    }
}

/// Resolves a paper to an external identifier (e.g. a PubMed ID).
#[async_trait]
pub trait IdentifierLookup: Send + Sync {
    /// `Ok(None)` means the registry has no match.
    async fn lookup(&self, query: &PaperQuery) -> Result<Option<String>>;
}

/// Lookup used when registry matching is switched off.
pub struct NoLookup;

#[async_trait]
impl IdentifierLookup for NoLookup {
    async fn lookup(&self, _query: &PaperQuery) -> Result<Option<String>> {
        Ok(None)
    }
}
