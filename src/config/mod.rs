//! 配置管理
//!
//! 只在启动时读取一次，优先级从低到高：
//! 1. 内置默认值
//! 2. `DOGGO_CONFIG` 指向的 YAML 文件（可选）
//! 3. 环境变量（`OLLAMA_API_URL`、`MODEL_NAME` 等）

mod env;


pub use env::{apply_env_overrides, EnvSource, StdEnv};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "DOGGO_CONFIG";

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件解析失败: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("配置项 {key} 的值无效: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub dictionary: DictionaryConfig,
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 请求体大小上限（字节）
    pub body_limit_bytes: usize,
    /// 允许跨域的来源，空表示不启用 CORS，`*` 表示任意来源
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            body_limit_bytes: 64 * 1024,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 上游推理服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub model: String,
    pub connect_timeout_secs: u64,
    /// 等待响应头以及相邻 chunk 之间的最长间隔
    pub read_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://ollama:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 120,
        }
    }
}

impl UpstreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// 词典配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    pub path: PathBuf,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/doggo_dictionary.csv"),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing 过滤表达式，如 `info` 或 `doggo_gpt_lib=debug,tower_http=info`
    pub level: String,
    /// 输出 JSON 格式日志
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// 从文件与环境变量加载配置
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&StdEnv)
    }

    /// 使用指定的环境变量来源加载
    pub fn load_from(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let mut config = match env.get(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        apply_env_overrides(&mut config, env)?;
        config.validate()?;
        Ok(config)
    }

    /// 读取 YAML 配置文件
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.upstream.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "upstream.base_url",
                format!("必须以 http:// 或 https:// 开头: {base_url}"),
            ));
        }
        if self.upstream.model.trim().is_empty() {
            return Err(ConfigError::invalid("upstream.model", "不能为空"));
        }
        if self.upstream.connect_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "upstream.connect_timeout_secs",
                "必须大于 0",
            ));
        }
        if self.upstream.read_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "upstream.read_timeout_secs",
                "必须大于 0",
            ));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::invalid("server.body_limit_bytes", "必须大于 0"));
        }
        Ok(())
    }
}
