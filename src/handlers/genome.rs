use super::AppState;
use crate::sequence;
use crate::types::{
    AvailableChromosomesRequest, AvailableChromosomesResponse, AvailableGenomesResponse,
    GenomeSequenceRequest, GenomeSequenceResponse,
};
use crate::Result;
use axum::{extract::State, Json};

pub async fn get_available_genomes(
    State(state): State<AppState>,
) -> Result<Json<AvailableGenomesResponse>> {
    let genomes = sequence::list_genomes(&state.context).await?;
    Ok(Json(AvailableGenomesResponse { genomes }))
}

pub async fn post_available_chromosomes(
    State(state): State<AppState>,
    Json(request): Json<AvailableChromosomesRequest>,
) -> Result<Json<AvailableChromosomesResponse>> {
    let chromosomes =
        sequence::list_chromosomes(&state.context, &request.species, &request.version).await?;
    Ok(Json(AvailableChromosomesResponse { chromosomes }))
}

pub async fn post_genome_sequence(
    State(state): State<AppState>,
    Json(request): Json<GenomeSequenceRequest>,
) -> Result<Json<GenomeSequenceResponse>> {
    let sequence = sequence::fetch_range(
        &state.context,
        &request.species,
        &request.version,
        &request.chromosome,
        request.begin,
        request.end,
    )
    .await?;

    Ok(Json(GenomeSequenceResponse {
        name: format!(
            "{}:{}-{}",
            request.chromosome, request.begin, request.end
        ),
        sequence,
    }))
}
