// External identifier lookup, behind a trait so registries can be swapped.
//
// PubMedLookup queries NCBI E-utilities. NoLookup is used when lookups are
// disabled, which is the default.

pub mod pubmed;
pub mod rate_limiter;
pub mod traits;

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;

pub use traits::{IdentifierLookup, NoLookup, PaperQuery};

/// Build the lookup the configuration asks for.
pub fn from_config(config: &Config) -> Result<Arc<dyn IdentifierLookup>> {
    if !config.pubmed_enabled {
        return Ok(Arc::new(NoLookup));
    }
    config.require_ncbi_email()?;
    let lookup = pubmed::PubMedLookup::new(
        &config.eutils_url,
        config.ncbi_email.clone(),
        config.ncbi_api_key.clone(),
        rate_limiter::RateLimiter::from_millis(config.lookup_delay_ms),
    )?;
    Ok(Arc::new(lookup))
}
