//! API error responses
//!
//! Every failure leaves the server as `{"error": {"code", "message"}}` with a
//! status derived from the underlying [`ClassifierError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use supplier_classifier_core::ClassifierError;

#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ClassifierError> for ApiError {
    fn from(err: ClassifierError) -> Self {
        let (status, code) = match &err {
            ClassifierError::ModelNotTrained => (StatusCode::BAD_REQUEST, "MODEL_NOT_TRAINED"),
            ClassifierError::DataLoad { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DATA_LOAD_FAILED")
            }
            ClassifierError::InvalidMatrix { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_MATRIX")
            }
            ClassifierError::Engine(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ENGINE_FAILURE"),
            ClassifierError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{} ({}): {}", self.status, self.code, self.message);
        } else {
            tracing::warn!("{} ({}): {}", self.status, self.code, self.message);
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ClassifierError::ModelNotTrained).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ClassifierError::data_load("x.csv", "file is empty")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(ClassifierError::Engine("boom".to_string())).code(),
            "ENGINE_FAILURE"
        );
        assert_eq!(
            ApiError::bad_request("no file uploaded").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_message_is_preserved() {
        let err = ApiError::from(ClassifierError::ModelNotTrained);
        assert_eq!(err.message(), "Model has not been trained yet");
    }
}
