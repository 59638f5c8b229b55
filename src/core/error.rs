//! 核心错误处理模块

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

use super::response::Envelope;
use crate::infrastructure::store::StoreError;

/// JSON 响应统一使用的内容类型
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// 核心错误类型
///
/// 在端点边界全部转换为 `ok:false` 信封，不会以传输层错误的形式泄漏。
#[derive(Debug, Error)]
pub enum CoreError {
    /// 字段缺失、索引越界等校验失败
    #[error("{0}")]
    Validation(String),
    /// 未知 action、无法解析的请求体
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    MethodNotAllowed(String),
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
    /// 存储在时限内没有响应，例如锁文件被其他进程占用
    #[error("storage did not respond within {}s", .0.as_secs_f64())]
    Timeout(Duration),
}

impl CoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CoreError::Validation(_) | CoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CoreError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            CoreError::Storage(_) | CoreError::Timeout(_) => error!(error = %self, "存储操作失败"),
            other => warn!(status = status.as_u16(), error = %other, "请求被拒绝"),
        }

        let body = Envelope::<()>::failure(self.to_string());
        json_response(status, body)
    }
}

/// 以显式的 `charset=utf-8` 内容类型输出 JSON
pub fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    response
}
