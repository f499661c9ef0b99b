mod annotations;
mod expression;
mod genome;
mod service_info;

pub use annotations::post_annotations;
pub use expression::post_expression;
pub use genome::{get_available_genomes, post_available_chromosomes, post_genome_sequence};
pub use service_info::service_info;

use crate::context::DataContext;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<DataContext>,
}

/// Centralized route table, shared between `main` and the test servers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/genome/list-available-genomes",
            get(get_available_genomes),
        )
        .route(
            "/api/genome/list-available-chromosomes",
            post(post_available_chromosomes),
        )
        .route("/api/genome/sequence", post(post_genome_sequence))
        .route("/api/annotations", post(post_annotations))
        .route("/api/expression", post(post_expression))
        .route("/", get(service_info))
        .route("/service-info", get(service_info))
        .with_state(state)
}
