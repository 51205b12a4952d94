use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use frontier::PipelineError;
use serde_json::json;

/// JSON error response for the API routes.
#[derive(Debug)]
pub(crate) struct ApiError(pub(crate) PipelineError);

impl ApiError {
    pub(crate) const fn status(&self) -> StatusCode {
        match self.0 {
            PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PipelineError::Acquisition(_) => StatusCode::BAD_GATEWAY,
            PipelineError::Estimation(_) | PipelineError::Optimization(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({ "error": self.0.to_string(), "kind": self.0.kind() });
        (status, Json(body)).into_response()
    }
}
