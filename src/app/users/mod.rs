//! 用户目录：列出、创建、按位置删除

pub mod handler;
pub mod model;
pub mod service;
