//! # 用户目录
//!
//! 一个极简的用户目录服务，包括：
//! - 单一 HTTP 端点，按 `action` 查询参数分发 list / create / delete
//! - 基于 JSON 文件的持久化存储
//! - 客户端控制器：渲染用户表格、提交新用户、按位置删除用户

pub mod app;
pub mod client;
pub mod core;
pub mod infrastructure;

pub use crate::app::users::model::{NewUser, User};
pub use crate::core::config::Config;
pub use crate::core::error::CoreError;
pub use crate::core::response::Envelope;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use std::{path::Path, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::app::users::{
    handler::{api_endpoint, health_check, AppState},
    service::UserService,
};
use crate::core::middleware::request_logging_middleware;
use crate::infrastructure::store::UserStore;

/// 根据配置和存储构建完整路由
pub fn build_router(config: &Config, store: Arc<dyn UserStore>) -> Router {
    let state = AppState {
        user_service: UserService::with_timeout(
            store,
            Duration::from_secs(config.http.timeout_seconds),
        ),
    };

    let mut app = Router::new()
        .route(&config.http.api_path, any(api_endpoint))
        .route("/health", get(health_check))
        .with_state(state);

    let public_dir = Path::new(&config.http.public_dir);
    if public_dir.is_dir() {
        app = app.fallback_service(ServeDir::new(public_dir));
    }

    app.layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
