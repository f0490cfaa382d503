use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use super::types::ErrorResponse;
use crate::error::ExtractError;

/// API 错误
///
/// 客户端问题映射为 4xx，其余为 500
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error_type: error_type.to_string(),
                message: message.into(),
                status_code: status.as_u16(),
            },
        }
    }

    /// 请求格式错误（400）
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", message)
    }

    /// 服务端内部错误（500）
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal", message)
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        if err.is_client_error() {
            warn!(error = %err, "请求被拒绝");
            Self::new(StatusCode::BAD_REQUEST, err.kind(), err.to_string())
        } else {
            error!(error = %err, "处理请求时出现内部错误");
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.kind(), err.to_string())
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        // 超过体积限制时为 413，其余为 400
        Self::new(err.status(), "Multipart", err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
