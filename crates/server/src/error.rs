use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use slidepress::ExportError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Service is shutting down")]
    ServiceUnavailable,

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ServiceError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "InvalidRequest"),
            Self::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "ServiceUnavailable"),
            Self::Export(e) => match e {
                ExportError::Input(_) => (StatusCode::BAD_REQUEST, "InvalidRequest"),
                ExportError::ChartNotFound { .. } => (StatusCode::NOT_FOUND, "ChartNotFound"),
                ExportError::SessionLaunch(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SessionLaunchFailed"),
                ExportError::SessionLost(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SessionLost"),
                ExportError::Assembly(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AssemblyFailed"),
                ExportError::Timeout { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "ExportTimeout"),
                ExportError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RenderFailed"),
                ExportError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ConfigError"),
            },
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status.is_server_error() {
            tracing::error!("{}: {}", code, self);
        }

        let body = Json(json!({
            "error": code,
            "details": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let status = |e: ServiceError| e.parts().0;

        assert_eq!(status(ExportError::Input("no slides".into()).into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(ExportError::ChartNotFound { index: 3, found: 1 }.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(ExportError::Timeout { limit: Duration::from_secs(1) }.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status(ServiceError::ServiceUnavailable), StatusCode::SERVICE_UNAVAILABLE);
    }
}
