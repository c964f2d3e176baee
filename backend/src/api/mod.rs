//! HTTP presentation layer.
//!
//! - `POST /v1/registrations` takes the registration form as multipart
//! - `GET /v1/users` and `/v1/users.csv` serve the user dashboard
//! - `GET /v1/expiry` and `/v1/expiry.csv` serve the expiry report
//! - uploaded proofs are served back from the bucket route

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::config::{Config, BUCKET_ROUTE};
use crate::error::RegistryError;
use crate::service::RegistrationService;

mod health;
mod registrations;
mod users;

pub use health::*;
pub use registrations::*;
pub use users::*;

/// Upper bound on a multipart registration body.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pub service: RegistrationService,
    pub config: Arc<Config>,
}

pub fn build_router(state: ApiState) -> Router {
    let bucket = ServeDir::new(&state.config.blob_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/v1/registrations", post(submit_registration))
        .route("/v1/users", get(list_users))
        .route("/v1/users.csv", get(export_users))
        .route("/v1/expiry", get(expiry_report))
        .route("/v1/expiry.csv", get(export_expiry_report))
        .nest_service(BUCKET_ROUTE, bucket)
        .layer(axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until `shutdown_rx` fires.
pub async fn serve_with_shutdown(
    state: ApiState,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let addr = state.config.bind_address;
    let router = build_router(state);

    info!("Starting HTTP API server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
            info!("Received shutdown signal, stopping API server...");
        })
        .await?;

    info!("API server stopped gracefully");
    Ok(())
}

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// The request could not be turned into a form or query at all.
    BadRequest(String),
    Registry(RegistryError),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::Registry(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Registry(RegistryError::Validation(e)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Registry(e @ RegistryError::Upload(_)) => {
                error!("{}", e);
                (StatusCode::BAD_GATEWAY, "Gagal mengunggah bukti transfer.".to_string())
            }
            ApiError::Registry(e @ RegistryError::Store(_)) => {
                error!("{}", e);
                (StatusCode::BAD_GATEWAY, "Gagal mengakses data registrasi.".to_string())
            }
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
