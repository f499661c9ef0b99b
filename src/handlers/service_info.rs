use crate::types::ServiceInfo;
use axum::Json;

pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        id: "genoserve".to_string(),
        name: "genoserve".to_string(),
        description: "genomic sequence, annotation and expression data server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
