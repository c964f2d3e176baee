use super::{ApiResponse, ApiState};
use axum::{extract::State, response::Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
}

pub async fn health_check(State(state): State<ApiState>) -> Json<ApiResponse<HealthResponse>> {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: state.config.database_url.is_some(),
    };

    Json(ApiResponse::success(response))
}
