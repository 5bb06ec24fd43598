//! Mapping of turn failures onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::pipeline::TurnError;

/// A failed turn as an HTTP response: `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(pub TurnError);

impl From<TurnError> for ApiError {
    fn from(e: TurnError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            TurnError::NoAudio | TurnError::MalformedAudio(_) => StatusCode::BAD_REQUEST,
            TurnError::ModelsNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            TurnError::Transcription(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let status = self.status();
        if status.is_server_error() {
            log::error!("api: {}", self.0);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::SttError;

    #[test]
    fn input_errors_are_bad_requests() {
        assert_eq!(ApiError(TurnError::NoAudio).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(TurnError::MalformedAudio("odd".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unloaded_models_are_unavailable() {
        assert_eq!(
            ApiError(TurnError::ModelsNotLoaded).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn transcription_failure_is_internal() {
        let err = ApiError(TurnError::Transcription(SttError::NoBackend));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
