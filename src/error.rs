// Error types shared by the service and HTTP layers
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("telemetry API responded with {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("request to telemetry API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("selection store error: {0}")]
    Selection(String),

    #[error("malformed live frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::InvalidRequest(_) | DashboardError::MalformedFrame(_) => {
                StatusCode::BAD_REQUEST
            }
            DashboardError::Upstream { .. } | DashboardError::Http(_) => StatusCode::BAD_GATEWAY,
            DashboardError::Selection(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            DashboardError::NotFound("disease x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DashboardError::InvalidRequest("bad interval".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        let upstream = DashboardError::Upstream {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            upstream.to_string(),
            "telemetry API responded with 500: boom"
        );
    }
}
