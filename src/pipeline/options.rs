// Per-request analysis options, from CLI flags or form fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

pub const DEFAULT_NUM_TOPICS: usize = 5;
pub const DEFAULT_NUM_WORDS: usize = 10;
pub const DEFAULT_NUM_TOP_PAPERS: usize = 5;

/// Knobs a caller picks for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub num_topics: usize,
    pub num_words: usize,
    pub num_top_papers: usize,
    pub skip_bibliography: bool,
    /// Extra stop words merged into the default English list.
    pub additional_stopwords: Vec<String>,
    pub include_decade_analysis: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            num_topics: DEFAULT_NUM_TOPICS,
            num_words: DEFAULT_NUM_WORDS,
            num_top_papers: DEFAULT_NUM_TOP_PAPERS,
            skip_bibliography: false,
            additional_stopwords: Vec::new(),
            include_decade_analysis: false,
        }
    }
}

impl AnalysisOptions {
    /// Read options from form fields (`numTopics`, `numWords`, `numTopPapers`,
    /// `skip_bibliography`, `stopwords`, `include_decade_analysis`).
    ///
    /// Missing fields take their defaults. Present fields must parse.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, AnalysisError> {
        let num_topics = match form_field(fields, "numTopics") {
            Some(raw) => {
                let n: i64 = raw
                    .parse()
                    .map_err(|_| AnalysisError::invalid("numTopics", raw))?;
                if n < 1 {
                    return Err(AnalysisError::InvalidTopicCount(n));
                }
                n as usize
            }
            None => DEFAULT_NUM_TOPICS,
        };

        let options = Self {
            num_topics,
            num_words: parse_count(form_field(fields, "numWords"), "numWords", DEFAULT_NUM_WORDS)?,
            num_top_papers: parse_count(
                form_field(fields, "numTopPapers"),
                "numTopPapers",
                DEFAULT_NUM_TOP_PAPERS,
            )?,
            skip_bibliography: parse_flag(form_field(fields, "skip_bibliography")),
            additional_stopwords: form_field(fields, "stopwords").map(parse_stopwords).unwrap_or_default(),
            include_decade_analysis: parse_flag(form_field(fields, "include_decade_analysis")),
        };
        options.validate()?;
        Ok(options)
    }

    /// Reject counts the pipeline can't work with.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.num_topics == 0 {
            return Err(AnalysisError::InvalidTopicCount(0));
        }
        if self.num_words == 0 {
            return Err(AnalysisError::invalid("numWords", 0));
        }
        if self.num_top_papers == 0 {
            return Err(AnalysisError::invalid("numTopPapers", 0));
        }
        Ok(())
    }
}

/// Split a comma-separated stop word list; blanks are dropped.
pub fn parse_stopwords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn form_field<'a>(fields: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_count(raw: Option<&str>, name: &str, default: usize) -> Result<usize, AnalysisError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n as usize),
        _ => Err(AnalysisError::invalid(name, raw)),
    }
}

fn parse_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1" || v.eq_ignore_ascii_case("on"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_form_uses_defaults() {
        let options = AnalysisOptions::from_form(&HashMap::new()).unwrap();
        assert_eq!(options, AnalysisOptions::default());
    }

    #[test]
    fn test_full_form() {
        let options = AnalysisOptions::from_form(&form(&[
            ("numTopics", "3"),
            ("numWords", "7"),
            ("numTopPapers", "2"),
            ("skip_bibliography", "TRUE"),
            ("stopwords", "cell, , Protein ,"),
            ("include_decade_analysis", "true"),
        ]))
        .unwrap();
        assert_eq!(options.num_topics, 3);
        assert_eq!(options.num_words, 7);
        assert_eq!(options.num_top_papers, 2);
        assert!(options.skip_bibliography);
        assert!(options.include_decade_analysis);
        assert_eq!(options.additional_stopwords, vec!["cell", "protein"]);
    }

    #[test]
    fn test_zero_and_negative_topics_rejected() {
        for raw in ["0", "-3"] {
            let err = AnalysisOptions::from_form(&form(&[("numTopics", raw)])).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidTopicCount(_)), "{raw}");
        }
    }

    #[test]
    fn test_non_numeric_count_rejected() {
        let err = AnalysisOptions::from_form(&form(&[("numWords", "ten")])).unwrap_err();
        assert_eq!(err.kind(), "invalid_parameter");
    }

    #[test]
    fn test_flags_default_false() {
        let options = AnalysisOptions::from_form(&form(&[("skip_bibliography", "no")])).unwrap();
        assert!(!options.skip_bibliography);
    }
}
