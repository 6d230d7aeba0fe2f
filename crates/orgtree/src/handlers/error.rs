use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orgtree_core::hierarchy::{hierarchy_error_to_status_code, HierarchyError};
use orgtree_core::storage::RepositoryError;

pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Wraps a JSON body rejection as a 400 validation error.
    pub fn from_rejection(rejection: JsonRejection) -> Self {
        let message = format!("Invalid request body: {}", rejection.body_text());
        Self(HierarchyError::Validation(message).into())
    }

    fn status_code(&self) -> StatusCode {
        let code = if let Some(err) = self.0.downcast_ref::<HierarchyError>() {
            hierarchy_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            hierarchy_error_to_status_code(&HierarchyError::Compute(err.clone()))
        } else {
            500
        };

        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(status = %status_code, error = %self.0, "Request failed");
        } else {
            tracing::debug!(status = %status_code, error = %self.0, "Request rejected");
        }

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
