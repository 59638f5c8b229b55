//! 用户目录处理器
//!
//! 单一端点，按 `action` 查询参数分发。所有失败都以 `ok:false`
//! 信封返回，不会交给 axum 的默认拒绝响应。

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Query, State},
    http::{Method, StatusCode},
    response::Response,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::str::FromStr;

use super::{
    model::{CreateUserRequest, DeleteUserRequest},
    service::UserService,
};
use crate::core::{error::json_response, error::CoreError, response::Envelope};

#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
}

#[derive(Debug, Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

/// 端点支持的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Create,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Create => "create",
            Action::Delete => "delete",
        }
    }

    /// 每个操作只接受一种 HTTP 方法
    pub fn method(self) -> Method {
        match self {
            Action::List => Method::GET,
            Action::Create | Action::Delete => Method::POST,
        }
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Action::List),
            "create" => Ok(Action::Create),
            "delete" => Ok(Action::Delete),
            other => Err(CoreError::BadRequest(format!("unknown action: {other}"))),
        }
    }
}

pub async fn api_endpoint(
    State(state): State<AppState>,
    method: Method,
    query: Option<Query<ActionQuery>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, CoreError> {
    let action = query
        .and_then(|Query(q)| q.action)
        .ok_or_else(|| CoreError::BadRequest("missing action parameter".to_string()))?
        .parse::<Action>()?;

    if method != action.method() {
        return Err(CoreError::MethodNotAllowed(format!(
            "action {} requires {}",
            action.as_str(),
            action.method()
        )));
    }

    let service = &state.user_service;
    let users = match action {
        Action::List => service.list().await?,
        Action::Create => {
            let request: CreateUserRequest = parse_body(body)?;
            service.create(request).await?
        }
        Action::Delete => {
            let request: DeleteUserRequest = parse_body(body)?;
            service.delete(request).await?
        }
    };

    Ok(json_response(StatusCode::OK, Envelope::success(users)))
}

/// 健康检查
pub async fn health_check(State(state): State<AppState>) -> Result<Response, CoreError> {
    let users = state.user_service.list().await?;
    Ok(json_response(
        StatusCode::OK,
        Envelope::success(serde_json::json!({
            "status": "healthy",
            "users": users.len(),
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    ))
}

fn parse_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, CoreError> {
    let bytes = body.map_err(|e| CoreError::BadRequest(format!("unreadable request body: {e}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| CoreError::BadRequest(format!("malformed JSON body: {e}")))?;
    // 派生的结构体反序列化也接受数组，请求体必须是对象
    if !value.is_object() {
        return Err(CoreError::BadRequest(
            "malformed JSON body: expected an object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| CoreError::BadRequest(format!("malformed JSON body: {e}")))
}
