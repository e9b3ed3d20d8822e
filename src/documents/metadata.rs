// Paper metadata from the file naming convention.
//
// Uploaded papers are expected to be named "<author> - <year> - <title>.pdf",
// e.g. "Smith et al. - 1997 - Protein folding in vitro.pdf". Anything else
// yields no metadata at all; downstream code treats every field as optional.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

static FILE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?) - (\d{4}) - (.*?)\.pdf$").expect("static regex"));

/// Author, year and title derived from a paper's file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub author: Option<String>,
    pub year: Option<i32>,
    pub title: Option<String>,
}

impl DocumentMetadata {
    /// Parse a bare file name (no directory components).
    ///
    /// Returns all-absent metadata when the name doesn't follow the
    /// three-field convention with a four-digit year.
    pub fn parse(file_name: &str) -> Self {
        let Some(caps) = FILE_NAME_PATTERN.captures(file_name) else {
            return Self::default();
        };

        let year = caps.get(2).and_then(|m| m.as_str().parse().ok());
        if year.is_none() {
            return Self::default();
        }

        Self {
            author: caps.get(1).map(|m| m.as_str().trim().to_string()),
            year,
            title: caps.get(3).map(|m| m.as_str().trim().to_string()),
        }
    }

    /// First author, for registry queries: the author field cut at "et al.".
    pub fn first_author(&self) -> Option<&str> {
        self.author
            .as_deref()
            .map(|a| a.split("et al.").next().unwrap_or(a).trim())
            .filter(|a| !a.is_empty())
    }

    /// Year as shown to users; absent years read "Unknown".
    pub fn year_label(&self) -> String {
        year_label(self.year)
    }
}

/// Render an optional publication year, "Unknown" when absent.
pub fn year_label(year: Option<i32>) -> String {
    year.map(|y| y.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_label_matches_free_function() {
        let meta = DocumentMetadata::parse("Lee - 2004 - Kinase signalling.pdf");
        assert_eq!(meta.year_label(), year_label(Some(2004)));
        assert_eq!(DocumentMetadata::default().year_label(), year_label(None));
        assert_eq!(year_label(None), "Unknown");
    }

    #[test]
    fn test_parse_conventional_name() {
        let meta = DocumentMetadata::parse("Smith et al. - 1997 - Protein folding in vitro.pdf");
        assert_eq!(meta.author.as_deref(), Some("Smith et al."));
        assert_eq!(meta.year, Some(1997));
        assert_eq!(meta.title.as_deref(), Some("Protein folding in vitro"));
        assert_eq!(meta.first_author(), Some("Smith"));
    }

    #[test]
    fn test_parse_rejects_short_year() {
        assert_eq!(DocumentMetadata::parse("Smith - 97 - Title.pdf"), DocumentMetadata::default());
    }

    #[test]
    fn test_parse_rejects_missing_dashes() {
        assert_eq!(DocumentMetadata::parse("Smith 1997 Title.pdf"), DocumentMetadata::default());
        assert_eq!(DocumentMetadata::parse("Smith - 1997.pdf"), DocumentMetadata::default());
    }

    #[test]
    fn test_year_label_unknown() {
        assert_eq!(DocumentMetadata::default().year_label(), "Unknown");
    }
}
