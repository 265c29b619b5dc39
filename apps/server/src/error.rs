use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use econdata_core::ServiceError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Service(#[from] ServiceError),
    #[error("Not Found")]
    NotFound,
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Service(e) => match e {
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::Analytics(_) => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::NotFound => StatusCode::NOT_FOUND,
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
