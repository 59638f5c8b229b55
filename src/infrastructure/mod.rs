//! 基础设施层：日志与持久化存储

pub mod logger;
pub mod store;
