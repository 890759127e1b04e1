use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct ApiErrorResponse {
    pub status: u16,
    pub message: Option<String>,
}

impl ApiErrorResponse {
    pub fn send(status: u16, message: Option<String>) -> Response {
        let status_code = StatusCode::from_u16(status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status_code, Json(Self { status, message })).into_response()
    }
}
