use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campus_core::CampusError;
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub struct CampusAxumError(pub CampusError);

impl From<CampusError> for CampusAxumError {
    fn from(e: CampusError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for CampusAxumError {
    fn from(rejection: JsonRejection) -> Self {
        Self(
            CampusError::bad_request("Failed to parse the request body as JSON")
                .with_errors(json!({ "_schema": [rejection.body_text()] })),
        )
    }
}

impl From<PathRejection> for CampusAxumError {
    fn from(rejection: PathRejection) -> Self {
        Self(CampusError::bad_request(rejection.body_text()))
    }
}

impl From<QueryRejection> for CampusAxumError {
    fn from(rejection: QueryRejection) -> Self {
        Self(CampusError::bad_request(rejection.body_text()))
    }
}

impl IntoResponse for CampusAxumError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Transport and internal details stay in the logs.
        match &err {
            CampusError::Network(_) | CampusError::Backend(_) => {
                warn!(error = %err, "request failed upstream")
            }
            CampusError::Config(_) | CampusError::Internal(_) => {
                error!(error = %err, "request failed")
            }
            _ => {}
        }

        (status, Json(err.to_json())).into_response()
    }
}

/// Handler result type.
pub type ApiResult<T> = Result<T, CampusAxumError>;
