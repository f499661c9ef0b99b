use super::AppState;
use crate::genekey::GeneKey;
use crate::join;
use crate::types::{AnnotationsRequest, AnnotationsResponse};
use crate::Result;
use axum::{extract::State, Json};

pub async fn post_annotations(
    State(state): State<AppState>,
    Json(request): Json<AnnotationsRequest>,
) -> Result<Json<AnnotationsResponse>> {
    let keys = GeneKey::parse_many(&request.gene_ids)?;
    let result = join::fetch_annotations(&state.context, &request.species, &keys).await?;

    if result.unmatched > 0 {
        tracing::debug!(
            species = %request.species,
            unmatched = result.unmatched,
            "annotation request had keys without a stored row"
        );
    }

    Ok(Json(AnnotationsResponse {
        results: result.records,
        unmatched: result.unmatched,
    }))
}
