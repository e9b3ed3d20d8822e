// PubMed identifier lookup via NCBI E-utilities.
//
// Uses `esearch` with a field-qualified term and takes the first PMID
// returned. Requests are paced by the shared rate limiter and carry the
// contact email (and API key, when configured) NCBI asks for.
//
// API docs: https://www.ncbi.nlm.nih.gov/books/NBK25499/

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::traits::{IdentifierLookup, PaperQuery};

const TOOL_NAME: &str = "topiclens";

/// PubMed search client.
pub struct PubMedLookup {
    client: Client,
    base_url: String,
    email: String,
    api_key: Option<String>,
    rate_limiter: RateLimiter,
}

impl PubMedLookup {
    pub fn new(
        base_url: &str,
        email: String,
        api_key: Option<String>,
        rate_limiter: RateLimiter,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("topiclens/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            api_key,
            rate_limiter,
        })
    }
}

/// The esearch term: title, first author and publication year, all required.
pub fn search_term(query: &PaperQuery) -> String {
    format!(
        "({}[Title]) AND ({}[Author]) AND {}[Date - Publication]",
        query.title, query.first_author, query.year
    )
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    esearchresult: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// First PMID of an esearch JSON body, if any.
pub fn first_id(body: &str) -> Result<Option<String>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("Failed to parse esearch response")?;
    Ok(response.esearchresult.idlist.into_iter().next())
}

#[async_trait]
impl IdentifierLookup for PubMedLookup {
    async fn lookup(&self, query: &PaperQuery) -> Result<Option<String>> {
        self.rate_limiter.acquire().await;

        let url = format!("{}/esearch.fcgi", self.base_url);
        let term = search_term(query);
        let mut params = vec![
            ("db", "pubmed"),
            ("term", term.as_str()),
            ("retmax", "3"),
            ("retmode", "json"),
            ("tool", TOOL_NAME),
            ("email", self.email.as_str()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.as_str()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .context("PubMed esearch request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("PubMed esearch returned {}: {}", status, body);
        }

        let body = response
            .text()
            .await
            .context("Failed to read esearch response")?;
        let id = first_id(&body)?;
        debug!(title = %query.title, pmid = ?id, "PubMed lookup");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_format() {
        let query = PaperQuery {
            title: "Protein folding".into(),
            first_author: "Smith".into(),
            year: 1997,
        };
        assert_eq!(
            search_term(&query),
            "(Protein folding[Title]) AND (Smith[Author]) AND 1997[Date - Publication]"
        );
    }

    #[test]
    fn test_first_id_takes_first_match() {
        let body = r#"{"header":{},"esearchresult":{"count":"2","idlist":["111","222"]}}"#;
        assert_eq!(first_id(body).unwrap(), Some("111".to_string()));
    }

    #[test]
    fn test_first_id_empty_list() {
        let body = r#"{"esearchresult":{"count":"0","idlist":[]}}"#;
        assert_eq!(first_id(body).unwrap(), None);
    }

    #[test]
    fn test_first_id_rejects_garbage() {
        assert!(first_id("<html>rate limited</html>").is_err());
    }
}
