use axum::Json;

use crate::api::models::service::ServiceMessage;

pub const SERVICE_MESSAGE: &str = "RTRWH Assessment API - Beta";

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    summary = "Service banner",
    responses(
        (status = 200, description = "Service is up", body = ServiceMessage),
    )
)]
pub async fn root() -> Json<ServiceMessage> {
    Json(ServiceMessage {
        message: SERVICE_MESSAGE.to_string(),
    })
}

/// Liveness probe for load balancers
pub async fn healthz() -> &'static str {
    "OK"
}
