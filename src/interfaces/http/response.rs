use crate::error::CoursePayError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// The `{success, message, data?}` envelope every endpoint answers with.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

impl CoursePayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CoursePayError::ValidationError(_)
            | CoursePayError::AlreadyEnrolled(_)
            | CoursePayError::InvalidSignature => StatusCode::BAD_REQUEST,
            CoursePayError::CourseNotFound(_)
            | CoursePayError::UserNotFound(_)
            | CoursePayError::LessonNotFound(_) => StatusCode::NOT_FOUND,
            CoursePayError::DuplicateEnrollment { .. } => StatusCode::CONFLICT,
            CoursePayError::NotEnrolled(_) | CoursePayError::Forbidden(_) => StatusCode::FORBIDDEN,
            CoursePayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CoursePayError::GatewayError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client verbatim.
    pub fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::BAD_GATEWAY => "Could not initiate order".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for CoursePayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
        }

        (status, Json(ApiResponse::failure(self.public_message()))).into_response()
    }
}
