//! Expression/annotation join engine.
//!
//! Joins gene keys against annotation rows, sample metadata, and per-sample
//! expression values. Both paths produce deterministic output ordering:
//! genes follow the caller's request order, samples ascend by sample id.
//! The backend's scan order is never relied on.

use crate::context::DataContext;
use crate::gateway::{GatewayError, Predicate, Value};
use crate::genekey::GeneKey;
use crate::types::{AnnotationRecord, SampleInfo};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

const ANNOTATION_COLUMNS: &[&str] = &[
    "chromosome_id",
    "gene_id",
    "tool",
    "evalue",
    "score",
    "seed_ortholog",
    "description",
];

const SAMPLE_COLUMNS: &[&str] = &[
    "experiment",
    "sample_id",
    "reference",
    "sequencing_id",
    "condition",
];

/// Annotation rows in request order plus the count of keys that had none.
#[derive(Debug)]
pub struct AnnotationResult {
    pub records: Vec<AnnotationRecord>,
    pub unmatched: usize,
}

/// Expression matrix parts; see [`crate::types::ExpressionResponse`] for the
/// flattening contract.
#[derive(Debug)]
pub struct ExpressionResult {
    pub genes: Vec<GeneKey>,
    pub samples: Vec<SampleInfo>,
    pub values: Vec<f64>,
}

fn storage_error(err: GatewayError) -> Error {
    Error::Storage(err.to_string())
}

fn key_tuple(key: &GeneKey) -> Vec<Value> {
    vec![
        key.chromosome_id.as_str().into(),
        key.gene_id.as_str().into(),
    ]
}

/// First-seen-order deduplication for the IN-set query; the response still
/// gets one entry per original occurrence.
fn unique_keys(keys: &[GeneKey]) -> Vec<&GeneKey> {
    let mut seen = HashSet::new();
    keys.iter().filter(|k| seen.insert(*k)).collect()
}

fn text_column(row: &[Value], index: usize, relation: &str) -> Result<String> {
    row[index]
        .as_text()
        .map(|s| s.to_string())
        .ok_or_else(|| Error::Storage(format!("unexpected column type in {relation}")))
}

fn optional_text(row: &[Value], index: usize) -> Option<String> {
    row[index].as_text().map(|s| s.to_string())
}

/// Fetches annotation rows for the given keys, in the caller's key order.
///
/// Duplicate keys in the input each receive a copy of the matched row; keys
/// without a row are omitted and counted. More than one stored row for the
/// same key is a data-quality fault, not a silent first-pick.
pub async fn fetch_annotations(
    ctx: &DataContext,
    species: &str,
    keys: &[GeneKey],
) -> Result<AnnotationResult> {
    let relation = format!("annotations/{species}");
    if !ctx
        .gateway
        .relation_exists(&relation)
        .await
        .map_err(storage_error)?
    {
        return Err(Error::UnknownSpecies(species.to_string()));
    }
    if keys.is_empty() {
        return Ok(AnnotationResult {
            records: Vec::new(),
            unmatched: 0,
        });
    }

    let rows = ctx
        .gateway
        .query(
            &relation,
            Predicate::KeyIn {
                columns: vec!["chromosome_id", "gene_id"],
                keys: unique_keys(keys).into_iter().map(key_tuple).collect(),
            },
            ANNOTATION_COLUMNS,
            &[],
        )
        .await
        .map_err(storage_error)?;

    let mut by_key: HashMap<GeneKey, AnnotationRecord> = HashMap::with_capacity(rows.len());
    for row in rows {
        let record = AnnotationRecord {
            chromosome_id: text_column(&row, 0, &relation)?,
            gene_id: text_column(&row, 1, &relation)?,
            tool: optional_text(&row, 2),
            evalue: row[3].as_real(),
            score: row[4].as_real(),
            seed_ortholog: optional_text(&row, 5),
            description: optional_text(&row, 6),
        };
        let key = GeneKey {
            chromosome_id: record.chromosome_id.clone(),
            gene_id: record.gene_id.clone(),
        };
        if by_key.insert(key.clone(), record).is_some() {
            return Err(Error::AmbiguousAnnotation(key.to_string()));
        }
    }

    let mut records = Vec::with_capacity(keys.len());
    let mut unmatched = 0;
    for key in keys {
        match by_key.get(key) {
            Some(record) => records.push(record.clone()),
            None => unmatched += 1,
        }
    }
    Ok(AnnotationResult { records, unmatched })
}

/// Resolves a numeric experiment selector to the experiment name used in
/// the backing relation names.
async fn resolve_experiment(
    ctx: &DataContext,
    species: &str,
    experiment_id: i64,
) -> Result<String> {
    let relation = format!("experiments/{species}");
    let rows = ctx
        .gateway
        .query(
            &relation,
            Predicate::Eq("experiment_id", Value::Int(experiment_id)),
            &["experiment"],
            &[],
        )
        .await
        .map_err(|err| match err {
            GatewayError::RelationNotFound(_) => Error::UnknownSpecies(species.to_string()),
            other => storage_error(other),
        })?;
    match rows.first() {
        Some(row) => text_column(row, 0, &relation),
        None => Err(Error::UnknownExperiment(experiment_id)),
    }
}

async fn fetch_samples(
    ctx: &DataContext,
    species: &str,
    experiment: &str,
) -> Result<Vec<SampleInfo>> {
    let relation = format!("samples/{species}/{experiment}");
    let rows = ctx
        .gateway
        .query(&relation, Predicate::All, SAMPLE_COLUMNS, &[])
        .await
        .map_err(|err| match err {
            // The registry promised this experiment; a missing backing
            // relation is a dataset build fault.
            GatewayError::RelationNotFound(name) => {
                Error::Storage(format!("missing backing relation: {name}"))
            }
            other => storage_error(other),
        })?;

    let mut samples = Vec::with_capacity(rows.len());
    for row in rows {
        samples.push(SampleInfo {
            experiment: text_column(&row, 0, &relation)?,
            sample_id: row[1]
                .as_int()
                .ok_or_else(|| Error::Storage(format!("unexpected column type in {relation}")))?,
            reference: text_column(&row, 2, &relation)?,
            sequencing_id: text_column(&row, 3, &relation)?,
            condition: text_column(&row, 4, &relation)?,
        });
    }
    samples.sort_by_key(|s| s.sample_id);
    Ok(samples)
}

/// Fetches the expression matrix for the given keys and experiment.
///
/// Sample order (matrix columns) is ascending sample id; gene order (matrix
/// rows) is the caller's key order restricted to keys with at least one
/// stored value. `values` is flattened row-major with absent (gene, sample)
/// pairs skipped.
pub async fn fetch_expression(
    ctx: &DataContext,
    species: &str,
    experiment_id: i64,
    keys: &[GeneKey],
) -> Result<ExpressionResult> {
    let experiment = resolve_experiment(ctx, species, experiment_id).await?;
    let samples = fetch_samples(ctx, species, &experiment).await?;

    if keys.is_empty() {
        return Ok(ExpressionResult {
            genes: Vec::new(),
            samples,
            values: Vec::new(),
        });
    }

    let relation = format!("expression/{species}/{experiment}");
    let unique = unique_keys(keys);
    let rows = ctx
        .gateway
        .query(
            &relation,
            Predicate::KeyIn {
                columns: vec!["chromosome_id", "gene_id"],
                keys: unique.iter().map(|&k| key_tuple(k)).collect(),
            },
            &["chromosome_id", "gene_id", "sample_id", "value"],
            &[],
        )
        .await
        .map_err(|err| match err {
            GatewayError::RelationNotFound(name) => {
                Error::Storage(format!("missing backing relation: {name}"))
            }
            other => storage_error(other),
        })?;

    let mut by_gene: HashMap<GeneKey, HashMap<i64, f64>> = HashMap::new();
    for row in rows {
        let key = GeneKey {
            chromosome_id: text_column(&row, 0, &relation)?,
            gene_id: text_column(&row, 1, &relation)?,
        };
        let sample_id = row[2]
            .as_int()
            .ok_or_else(|| Error::Storage(format!("unexpected column type in {relation}")))?;
        let value = row[3]
            .as_real()
            .ok_or_else(|| Error::Storage(format!("unexpected column type in {relation}")))?;
        by_gene.entry(key).or_default().insert(sample_id, value);
    }

    // Canonical row order: distinct keys present in the results, in the
    // caller's original order.
    let genes: Vec<GeneKey> = unique
        .into_iter()
        .filter(|key| by_gene.contains_key(*key))
        .cloned()
        .collect();

    let mut values = Vec::with_capacity(genes.len() * samples.len());
    for gene in &genes {
        let per_sample = &by_gene[gene];
        for sample in &samples {
            if let Some(value) = per_sample.get(&sample.sample_id) {
                values.push(*value);
            }
        }
    }

    Ok(ExpressionResult {
        genes,
        samples,
        values,
    })
}
