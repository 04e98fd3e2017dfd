use thiserror::Error;

/// RenderError
///
/// Failures raised by the template and JSON engines. These never escape a
/// dispatch: the view helpers turn them into a 500 response.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template not found: {0}")]
    MissingTemplate(String),
}

/// HttpError
///
/// Raised while converting an incoming axum request into a controller
/// [`Request`](crate::http::Request).
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),
}
