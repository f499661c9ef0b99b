use crate::genekey::GeneKey;
use serde::{Deserialize, Serialize};

/// One dataset instance, named `{species}-{version}` in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableGenome {
    pub species: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct AvailableGenomesResponse {
    pub genomes: Vec<AvailableGenome>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableChromosomesRequest {
    pub species: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct AvailableChromosomesResponse {
    pub chromosomes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenomeSequenceRequest {
    pub species: String,
    pub version: String,
    pub chromosome: String,
    /// Starting index (inclusive).
    pub begin: u64,
    /// Ending index (inclusive).
    pub end: u64,
}

#[derive(Debug, Serialize)]
pub struct GenomeSequenceResponse {
    /// `chromosome:begin-end` label for the returned range.
    pub name: String,
    pub sequence: String,
}

/// One annotation row for a gene. Annotation tools do not report every
/// field, hence the optionals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationRecord {
    #[serde(rename = "chromosomeId")]
    pub chromosome_id: String,
    #[serde(rename = "geneId")]
    pub gene_id: String,
    pub tool: Option<String>,
    pub evalue: Option<f64>,
    pub score: Option<f64>,
    #[serde(rename = "seedOrtholog")]
    pub seed_ortholog: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnnotationsRequest {
    pub species: String,
    #[serde(rename = "geneIds")]
    pub gene_ids: Vec<String>,
}

/// Annotation results in request order. Keys with no annotation row are
/// omitted from `results` and counted in `unmatched`.
#[derive(Debug, Serialize)]
pub struct AnnotationsResponse {
    pub results: Vec<AnnotationRecord>,
    pub unmatched: usize,
}

/// One biological sample within an experiment; `sample_id` is the stable
/// sort/join key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleInfo {
    pub experiment: String,
    #[serde(rename = "sampleId")]
    pub sample_id: i64,
    pub reference: String,
    #[serde(rename = "sequencingId")]
    pub sequencing_id: String,
    pub condition: String,
}

#[derive(Debug, Deserialize)]
pub struct ExpressionRequest {
    pub species: String,
    #[serde(rename = "experimentId")]
    pub experiment_id: i64,
    #[serde(rename = "geneIds", default)]
    pub gene_ids: Vec<String>,
}

/// Flattened expression matrix.
///
/// `values` is row-major: for each gene (request order) for each sample
/// (ascending sample id) the measured value. Pairs absent from storage are
/// skipped rather than null-filled, so `values.len()` may be shorter than
/// `genes.len() * samples.len()`.
#[derive(Debug, Serialize)]
pub struct ExpressionResponse {
    pub genes: Vec<GeneKey>,
    pub samples: Vec<SampleInfo>,
    pub values: Vec<f64>,
}

/// Service identity record for health checks.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
}
