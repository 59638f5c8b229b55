//! 日志基础设施

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub struct Logger;

impl Logger {
    /// 初始化全局日志
    ///
    /// `RUST_LOG` 存在时优先生效，否则使用配置中的级别。
    /// 重复初始化会被忽略，方便测试和多个入口共用。
    pub fn init(level: &str) {
        let default_level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
        let mut filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();
        if let Ok(directive) = "tower_http=debug".parse() {
            filter = filter.add_directive(directive);
        }

        let _ = tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter(filter)
            .try_init();
    }
}
