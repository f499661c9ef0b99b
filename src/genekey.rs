//! Gene identifier parsing.
//!
//! Clients address genes with a single opaque string of the form
//! `{chromosome_id}_{gene_id}`. The gene id never contains the separator,
//! but the chromosome id may (e.g. `scaffold_3`), so the string is split on
//! the *last* underscore and the leading segments are kept intact.

use crate::{Error, Result};
use serde::Serialize;

const SEPARATOR: char = '_';

/// Composite join/lookup key for a single gene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GeneKey {
    #[serde(rename = "chromosomeId")]
    pub chromosome_id: String,
    #[serde(rename = "geneId")]
    pub gene_id: String,
}

impl GeneKey {
    /// Parses one client-supplied identifier.
    pub fn parse(identifier: &str) -> Result<Self> {
        match identifier.rsplit_once(SEPARATOR) {
            Some((chromosome_id, gene_id)) if !chromosome_id.is_empty() && !gene_id.is_empty() => {
                Ok(GeneKey {
                    chromosome_id: chromosome_id.to_string(),
                    gene_id: gene_id.to_string(),
                })
            }
            _ => Err(Error::MalformedIdentifier(identifier.to_string())),
        }
    }

    /// Parses a whole request list, preserving order and duplicates.
    ///
    /// A client may legitimately ask for the same gene twice; both copies
    /// must come back in their original positions, so no deduplication
    /// happens here.
    pub fn parse_many<I, S>(identifiers: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        identifiers
            .into_iter()
            .map(|id| Self::parse(id.as_ref()))
            .collect()
    }
}

impl std::fmt::Display for GeneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.chromosome_id, SEPARATOR, self.gene_id)
    }
}
