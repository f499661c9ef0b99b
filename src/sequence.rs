//! Chunked sequence store.
//!
//! Chromosome sequences are stored as fixed-length chunk rows keyed by
//! `(chromosome_id, chunk_id)`, with `chunk_id` a dense 0-based index in
//! genomic position order. Every chunk except possibly the last has exactly
//! the configured chunk length, so chunk boundaries are length-aligned and
//! an arbitrary `[begin, end]` range maps to the chunk ids
//! `begin / L ..= end / L`.

use crate::context::DataContext;
use crate::gateway::{GatewayError, Predicate};
use crate::types::AvailableGenome;
use crate::{Error, Result};
use std::collections::BTreeSet;

const GENOME_PREFIX: &str = "genomes/";

fn genome_relation(species: &str, version: &str) -> String {
    format!("{GENOME_PREFIX}{species}-{version}")
}

fn storage_error(err: GatewayError) -> Error {
    Error::Storage(err.to_string())
}

/// Lists dataset instances by the `{species}-{version}` naming convention.
///
/// The version is everything after the last `-`, so species ids may contain
/// the separator. Relations not matching the convention are skipped.
pub async fn list_genomes(ctx: &DataContext) -> Result<Vec<AvailableGenome>> {
    let names = ctx
        .gateway
        .list_relations(GENOME_PREFIX)
        .await
        .map_err(storage_error)?;

    let mut genomes = Vec::with_capacity(names.len());
    for name in names {
        let suffix = &name[GENOME_PREFIX.len()..];
        match suffix.rsplit_once('-') {
            Some((species, version)) if !species.is_empty() && !version.is_empty() => {
                genomes.push(AvailableGenome {
                    species: species.to_string(),
                    version: version.to_string(),
                });
            }
            _ => {
                tracing::warn!("skipping genome relation with unrecognized name: {name}");
            }
        }
    }
    Ok(genomes)
}

/// Distinct chromosome ids of one genome, ascending.
pub async fn list_chromosomes(
    ctx: &DataContext,
    species: &str,
    version: &str,
) -> Result<Vec<String>> {
    let relation = genome_relation(species, version);
    let rows = ctx
        .gateway
        .query(&relation, Predicate::All, &["chromosome_id"], &[])
        .await
        .map_err(|err| match err {
            GatewayError::RelationNotFound(_) => {
                Error::UnknownSpecies(format!("{species}-{version}"))
            }
            other => storage_error(other),
        })?;

    let mut chromosomes = BTreeSet::new();
    for row in rows {
        match row[0].as_text() {
            Some(id) => {
                chromosomes.insert(id.to_string());
            }
            None => {
                return Err(Error::Storage(format!(
                    "non-text chromosome_id in {relation}"
                )))
            }
        }
    }
    Ok(chromosomes.into_iter().collect())
}

struct ChunkRow {
    chunk_id: i64,
    sequence: String,
}

/// Reconstructs the inclusive range `[begin, end]` of a chromosome.
///
/// Retrieves the minimal set of chunk rows, re-sorts them by chunk id (the
/// backend's row order is never trusted), validates that they form a dense,
/// consistently sized run, and slices the requested span out of the
/// concatenation. Any gap, duplicate, or length inconsistency is corrupt
/// data and surfaces as [`Error::SequenceNotFound`] rather than a wrong
/// substring.
pub async fn fetch_range(
    ctx: &DataContext,
    species: &str,
    version: &str,
    chromosome: &str,
    begin: u64,
    end: u64,
) -> Result<String> {
    if end < begin {
        return Err(Error::InvalidRange(format!(
            "{chromosome}:{begin}-{end} has end before begin"
        )));
    }
    let span = end - begin + 1;
    if span > ctx.max_sequence_span {
        return Err(Error::RangeTooLarge {
            begin,
            end,
            max: ctx.max_sequence_span,
        });
    }

    let chunk_length = ctx.chunk_length;
    let first_chunk = (begin / chunk_length) as i64;
    let last_chunk = (end / chunk_length) as i64;
    let not_found = || Error::SequenceNotFound(format!("{chromosome}:{begin}-{end}"));

    let relation = genome_relation(species, version);
    let rows = ctx
        .gateway
        .query(
            &relation,
            Predicate::And(vec![
                Predicate::Eq("chromosome_id", chromosome.into()),
                Predicate::IntRange {
                    column: "chunk_id",
                    lo: first_chunk,
                    hi: last_chunk,
                },
            ]),
            &["chunk_id", "sequence", "length"],
            &[],
        )
        .await
        .map_err(|err| match err {
            GatewayError::RelationNotFound(_) => {
                Error::UnknownSpecies(format!("{species}-{version}"))
            }
            other => storage_error(other),
        })?;

    let mut chunks = Vec::with_capacity(rows.len());
    for row in rows {
        let chunk_id = row[0].as_int().ok_or_else(not_found)?;
        let sequence = row[1].as_text().ok_or_else(not_found)?.to_string();
        let length = row[2].as_int().ok_or_else(not_found)?;
        if length < 0 || sequence.len() != length as usize {
            return Err(not_found());
        }
        chunks.push(ChunkRow { chunk_id, sequence });
    }
    chunks.sort_by_key(|c| c.chunk_id);

    // A dense run of chunk ids, every chunk before the last one full-length.
    let expected = (last_chunk - first_chunk + 1) as usize;
    if chunks.len() != expected {
        return Err(not_found());
    }
    for (i, chunk) in chunks.iter().enumerate() {
        if chunk.chunk_id != first_chunk + i as i64 {
            return Err(not_found());
        }
        if i + 1 < chunks.len() && chunk.sequence.len() != chunk_length as usize {
            return Err(not_found());
        }
    }

    let buffer: String = chunks.into_iter().map(|c| c.sequence).collect();
    let offset = (begin % chunk_length) as usize;
    buffer
        .get(offset..offset + span as usize)
        .map(|s| s.to_string())
        .ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MemoryGateway, Value};
    use std::sync::Arc;

    fn chunk_row(chromosome: &str, chunk_id: i64, sequence: &str) -> Vec<Value> {
        vec![
            chromosome.into(),
            Value::Int(chunk_id),
            sequence.into(),
            Value::Int(sequence.len() as i64),
        ]
    }

    const COLUMNS: &[&str] = &["chromosome_id", "chunk_id", "sequence", "length"];

    fn context(rows: Vec<Vec<Value>>) -> DataContext {
        let gateway =
            MemoryGateway::new().with_relation("genomes/picea-v1", COLUMNS, rows);
        DataContext::new(Arc::new(gateway), 1000, 1_000_000)
    }

    fn two_chunk_context() -> DataContext {
        // Chunks inserted out of order on purpose.
        context(vec![
            chunk_row("Chr01", 1, &"T".repeat(1000)),
            chunk_row("Chr01", 0, &"A".repeat(1000)),
        ])
    }

    #[tokio::test]
    async fn test_full_range_in_chunk_order() {
        let ctx = two_chunk_context();
        let sequence = fetch_range(&ctx, "picea", "v1", "Chr01", 0, 1999)
            .await
            .unwrap();
        assert_eq!(sequence.len(), 2000);
        assert_eq!(&sequence[..1000], "A".repeat(1000));
        assert_eq!(&sequence[1000..], "T".repeat(1000));
    }

    #[tokio::test]
    async fn test_range_spanning_chunk_boundary() {
        let ctx = two_chunk_context();
        let sequence = fetch_range(&ctx, "picea", "v1", "Chr01", 998, 1002)
            .await
            .unwrap();
        assert_eq!(sequence, "AATTT");
    }

    #[tokio::test]
    async fn test_result_length_is_inclusive_span() {
        let ctx = two_chunk_context();
        for (begin, end) in [(0, 0), (5, 14), (999, 1000), (1500, 1999)] {
            let sequence = fetch_range(&ctx, "picea", "v1", "Chr01", begin, end)
                .await
                .unwrap();
            assert_eq!(sequence.len() as u64, end - begin + 1);
        }
    }

    #[tokio::test]
    async fn test_character_positions() {
        // Distinct content per chunk so positions are verifiable.
        let chunk0: String = (0..1000).map(|i| if i % 2 == 0 { 'A' } else { 'C' }).collect();
        let chunk1: String = (0..1000).map(|i| if i % 2 == 0 { 'G' } else { 'T' }).collect();
        let ctx = context(vec![
            chunk_row("Chr01", 0, &chunk0),
            chunk_row("Chr01", 1, &chunk1),
        ]);
        let sequence = fetch_range(&ctx, "picea", "v1", "Chr01", 997, 1004)
            .await
            .unwrap();
        assert_eq!(sequence, "CACGTGTG");
    }

    #[tokio::test]
    async fn test_short_final_chunk() {
        let ctx = context(vec![
            chunk_row("Chr01", 0, &"A".repeat(1000)),
            chunk_row("Chr01", 1, "GATTACA"),
        ]);
        let sequence = fetch_range(&ctx, "picea", "v1", "Chr01", 999, 1006)
            .await
            .unwrap();
        assert_eq!(sequence, "AGATTACA");
    }

    #[tokio::test]
    async fn test_range_too_large_never_partially_succeeds() {
        let ctx = two_chunk_context();
        let err = fetch_range(&ctx, "picea", "v1", "Chr01", 0, 1_000_000)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RangeTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_end_before_begin() {
        let ctx = two_chunk_context();
        let err = fetch_range(&ctx, "picea", "v1", "Chr01", 10, 9)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRange(_)));
    }

    #[tokio::test]
    async fn test_missing_chromosome() {
        let ctx = two_chunk_context();
        let err = fetch_range(&ctx, "picea", "v1", "Chr09", 0, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SequenceNotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_genome() {
        let ctx = two_chunk_context();
        let err = fetch_range(&ctx, "pinus", "v1", "Chr01", 0, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownSpecies(_)));
    }

    #[tokio::test]
    async fn test_chunk_gap_is_corrupt() {
        let ctx = context(vec![
            chunk_row("Chr01", 0, &"A".repeat(1000)),
            chunk_row("Chr01", 2, &"T".repeat(1000)),
        ]);
        let err = fetch_range(&ctx, "picea", "v1", "Chr01", 0, 2500)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SequenceNotFound(_)));
    }

    #[tokio::test]
    async fn test_non_final_short_chunk_is_corrupt() {
        let ctx = context(vec![
            chunk_row("Chr01", 0, &"A".repeat(900)),
            chunk_row("Chr01", 1, &"T".repeat(1000)),
        ]);
        let err = fetch_range(&ctx, "picea", "v1", "Chr01", 0, 1500)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SequenceNotFound(_)));
    }

    #[tokio::test]
    async fn test_length_column_mismatch_is_corrupt() {
        let ctx = context(vec![vec![
            "Chr01".into(),
            Value::Int(0),
            "AAAA".into(),
            Value::Int(1000),
        ]]);
        let err = fetch_range(&ctx, "picea", "v1", "Chr01", 0, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SequenceNotFound(_)));
    }

    #[tokio::test]
    async fn test_range_past_end_of_chromosome() {
        let ctx = context(vec![chunk_row("Chr01", 0, "GATTACA")]);
        let err = fetch_range(&ctx, "picea", "v1", "Chr01", 5, 20)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SequenceNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_chromosomes_distinct_ascending() {
        let ctx = context(vec![
            chunk_row("Chr02", 0, "AA"),
            chunk_row("Chr01", 0, "CC"),
            chunk_row("Chr01", 1, "GG"),
        ]);
        let chromosomes = list_chromosomes(&ctx, "picea", "v1").await.unwrap();
        assert_eq!(chromosomes, vec!["Chr01", "Chr02"]);
    }

    #[tokio::test]
    async fn test_list_chromosomes_unknown_genome() {
        let ctx = two_chunk_context();
        let err = list_chromosomes(&ctx, "pinus", "v9").await.unwrap_err();
        assert!(matches!(err, Error::UnknownSpecies(_)));
    }

    #[tokio::test]
    async fn test_list_genomes_naming_convention() {
        let gateway = MemoryGateway::new()
            .with_relation("genomes/picea-abies-v2.0", COLUMNS, vec![])
            .with_relation("genomes/pinus-v1", COLUMNS, vec![])
            .with_relation("genomes/badname", COLUMNS, vec![])
            .with_relation("annotations/picea", &["chromosome_id"], vec![]);
        let ctx = DataContext::new(Arc::new(gateway), 1000, 1_000_000);
        let genomes = list_genomes(&ctx).await.unwrap();
        assert_eq!(
            genomes,
            vec![
                AvailableGenome {
                    species: "picea-abies".to_string(),
                    version: "v2.0".to_string(),
                },
                AvailableGenome {
                    species: "pinus".to_string(),
                    version: "v1".to_string(),
                },
            ]
        );
    }
}
