use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Default NCBI E-utilities endpoint for identifier lookups.
pub const DEFAULT_EUTILS_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Central configuration loaded from environment variables.
///
/// Everything here is process-wide and has a default; per-request knobs
/// (topic count, words per topic, ...) live in `AnalysisOptions` instead.
/// The .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Terms appearing in more than this fraction of documents are dropped.
    pub max_df: f64,
    /// Terms appearing in fewer than this many documents are dropped.
    pub min_df: usize,
    /// Seed for topic model initialisation; identical input gives identical output.
    pub seed: u64,
    /// Variational EM passes over the corpus.
    pub max_iter: usize,
    /// Whether top papers are matched against PubMed.
    pub pubmed_enabled: bool,
    /// Contact address NCBI asks clients to send with every request.
    pub ncbi_email: String,
    /// Optional NCBI API key (raises the allowed request rate).
    pub ncbi_api_key: Option<String>,
    pub eutils_url: String,
    /// Minimum delay between two identifier lookups.
    pub lookup_delay_ms: u64,
    /// Deadline for a single analysis request.
    pub timeout_secs: u64,
    /// Largest topic count a request may ask for.
    pub max_topics: usize,
    /// Parent directory for per-request upload staging.
    pub staging_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_df: 0.95,
            min_df: 1,
            seed: 42,
            max_iter: 10,
            pubmed_enabled: false,
            ncbi_email: String::new(),
            ncbi_api_key: None,
            eutils_url: DEFAULT_EUTILS_URL.to_string(),
            lookup_delay_ms: 500,
            timeout_secs: 600,
            max_topics: 100,
            staging_dir: env::temp_dir(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            max_df: parse_var("TOPICLENS_MAX_DF", defaults.max_df)?,
            min_df: parse_var("TOPICLENS_MIN_DF", defaults.min_df)?,
            seed: parse_var("TOPICLENS_SEED", defaults.seed)?,
            max_iter: parse_var("TOPICLENS_MAX_ITER", defaults.max_iter)?,
            pubmed_enabled: matches!(
                env::var("TOPICLENS_PUBMED").as_deref(),
                Ok("true") | Ok("1")
            ),
            ncbi_email: env::var("NCBI_EMAIL").unwrap_or_default(),
            ncbi_api_key: env::var("NCBI_API_KEY").ok().filter(|k| !k.is_empty()),
            eutils_url: env::var("NCBI_EUTILS_URL").unwrap_or(defaults.eutils_url),
            lookup_delay_ms: parse_var("TOPICLENS_LOOKUP_DELAY_MS", defaults.lookup_delay_ms)?,
            timeout_secs: parse_var("TOPICLENS_TIMEOUT_SECS", defaults.timeout_secs)?,
            max_topics: parse_var("TOPICLENS_MAX_TOPICS", defaults.max_topics)?,
            staging_dir: env::var_os("TOPICLENS_STAGING_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.staging_dir),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the vectorizer or the model cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            anyhow::bail!("TOPICLENS_MAX_DF must be in (0, 1], got {}", self.max_df);
        }
        if self.max_iter == 0 {
            anyhow::bail!("TOPICLENS_MAX_ITER must be at least 1");
        }
        if self.max_topics == 0 {
            anyhow::bail!("TOPICLENS_MAX_TOPICS must be at least 1");
        }
        Ok(())
    }

    /// Check that PubMed lookups can identify themselves to NCBI.
    /// Call this before building a PubMed lookup.
    pub fn require_ncbi_email(&self) -> Result<()> {
        if self.ncbi_email.is_empty() {
            anyhow::bail!(
                "NCBI_EMAIL not set. NCBI requires a contact address for E-utilities.\n\
                 Add it to your .env file or set TOPICLENS_PUBMED=false."
            );
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        _ => Ok(default),
    }
}
