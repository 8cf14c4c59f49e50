//! JSON error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Catalog(#[from] ivm_core::Error),

    #[error(transparent)]
    Store(#[from] ivm_showroom::StoreError),

    #[error(transparent)]
    Vertex(#[from] ivm_vertex::VertexError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::Catalog(ivm_core::Error::UnknownModel(_)) => StatusCode::NOT_FOUND,
            Self::Catalog(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Vertex(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = json!({
            "status": "error",
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
