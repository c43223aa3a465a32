use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimplewireError>;

/// Errors raised by route registration and dependency resolution.
///
/// The first three variants are setup-time failures: they are returned
/// synchronously from [`register`](crate::register::register) and should
/// abort application startup. The container variants can also surface at
/// request time, when the forwarding handler resolves the service instance.
#[derive(Debug, Error)]
pub enum SimplewireError {
    #[error("Method '{method}' has no inspectable signature")]
    Introspection { method: String },

    #[error("Method '{method}' not found on service '{service}'")]
    UnknownMethod { service: String, method: String },

    #[error("Router has no HTTP verb '{verb}'")]
    UnsupportedVerb { verb: String },

    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },
}

impl axum::response::IntoResponse for SimplewireError {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::INTERNAL_SERVER_ERROR;
        let body = axum::Json(serde_json::json!({
            "statusCode": status.as_u16(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
