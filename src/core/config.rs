//! 服务配置
//!
//! 从 TOML 文件加载，文件不存在时使用默认值，部分字段可被环境变量覆盖。

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/directory.toml";

/// 覆盖 `http.port` 的环境变量
pub const PORT_ENV: &str = "DIRECTORY_PORT";
/// 覆盖 `storage.data_file` 的环境变量
pub const DATA_FILE_ENV: &str = "DIRECTORY_DATA_FILE";

/// 用户目录服务配置
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务配置
    pub http: HttpConfig,
    /// 存储配置
    pub storage: StorageConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 绑定地址
    pub bind_address: String,
    /// HTTP 服务端口
    pub port: u16,
    /// 请求超时时间（秒）
    pub timeout_seconds: u64,
    /// 唯一 API 端点的路径
    pub api_path: String,
    /// 静态页面目录，存在时挂载在 `/`
    pub public_dir: PathBuf,
}

/// 存储配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 用户集合的 JSON 文件
    pub data_file: PathBuf,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)，RUST_LOG 优先
    pub level: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            timeout_seconds: 10,
            api_path: "/api".to_string(),
            public_dir: PathBuf::from("public"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/users.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// 配置的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Defaults,
}

impl Config {
    /// 解析 TOML 文件，未出现的字段取默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 文件存在则读取，否则使用默认值；随后应用环境变量并校验。
    /// 返回值里带上来源，由调用方在日志初始化之后记录。
    pub fn load(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        let (mut config, source) = if path.exists() {
            (Self::from_file(path)?, ConfigSource::File)
        } else {
            (Self::default(), ConfigSource::Defaults)
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok((config, source))
    }

    /// 应用环境变量覆盖；`lookup` 便于测试时注入
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV) {
            self.http.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{PORT_ENV} 不是有效端口: {port}")))?;
        }
        if let Some(data_file) = lookup(DATA_FILE_ENV) {
            self.storage.data_file = PathBuf::from(data_file);
        }
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Invalid("HTTP端口必须大于0".to_string()));
        }
        if self.http.bind_address.is_empty() {
            return Err(ConfigError::Invalid("绑定地址不能为空".to_string()));
        }
        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::Invalid("请求超时必须大于0".to_string()));
        }
        if !self.http.api_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "API 路径必须以 / 开头: {}",
                self.http.api_path
            )));
        }
        if self.storage.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("数据文件路径不能为空".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.logging.level, valid_levels
            )));
        }

        Ok(())
    }

    /// 监听地址，形如 `127.0.0.1:3000`
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.http.bind_address, self.http.port)
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("无法读取配置文件 {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("配置文件 {} 解析失败: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("配置无效: {0}")]
    Invalid(String),
}
