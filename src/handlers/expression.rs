use super::AppState;
use crate::genekey::GeneKey;
use crate::join;
use crate::types::{ExpressionRequest, ExpressionResponse};
use crate::Result;
use axum::{extract::State, Json};

pub async fn post_expression(
    State(state): State<AppState>,
    Json(request): Json<ExpressionRequest>,
) -> Result<Json<ExpressionResponse>> {
    let keys = GeneKey::parse_many(&request.gene_ids)?;
    let result = join::fetch_expression(
        &state.context,
        &request.species,
        request.experiment_id,
        &keys,
    )
    .await?;

    Ok(Json(ExpressionResponse {
        genes: result.genes,
        samples: result.samples,
        values: result.values,
    }))
}
