//! 应用层

pub mod users;
