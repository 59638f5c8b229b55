//! 核心层：统一响应、错误处理、中间件与配置

pub mod config;
pub mod error;
pub mod middleware;
pub mod response;
