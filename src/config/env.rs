//! 环境变量覆盖

use super::{Config, ConfigError};
use std::path::PathBuf;
use std::str::FromStr;

/// 环境变量来源
pub trait EnvSource {
    /// 读取变量，空字符串视为未设置
    fn get(&self, key: &str) -> Option<String>;
}

/// 进程环境变量
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnv;

impl EnvSource for StdEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

impl EnvSource for std::collections::HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        std::collections::HashMap::get(self, key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

fn parse_var<T>(env: &dyn EnvSource, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::invalid(key, format!("{raw:?}: {e}"))),
        None => Ok(None),
    }
}

fn parse_bool(env: &dyn EnvSource, key: &str) -> Result<Option<bool>, ConfigError> {
    match env.get(key) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::invalid(key, format!("{raw:?} 不是布尔值"))),
        },
        None => Ok(None),
    }
}

/// 用环境变量覆盖配置
pub fn apply_env_overrides(config: &mut Config, env: &dyn EnvSource) -> Result<(), ConfigError> {
    if let Some(host) = env.get("HOST") {
        config.server.host = host;
    }
    if let Some(port) = parse_var::<u16>(env, "PORT")? {
        config.server.port = port;
    }
    if let Some(limit) = parse_var::<usize>(env, "BODY_LIMIT_BYTES")? {
        config.server.body_limit_bytes = limit;
    }
    if let Some(origins) = env.get("CORS_ALLOWED_ORIGINS") {
        config.server.cors_allowed_origins = origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
    }

    if let Some(url) = env.get("OLLAMA_API_URL") {
        config.upstream.base_url = url;
    }
    if let Some(model) = env.get("MODEL_NAME") {
        config.upstream.model = model;
    }
    if let Some(secs) = parse_var::<u64>(env, "UPSTREAM_CONNECT_TIMEOUT_SECS")? {
        config.upstream.connect_timeout_secs = secs;
    }
    if let Some(secs) = parse_var::<u64>(env, "UPSTREAM_READ_TIMEOUT_SECS")? {
        config.upstream.read_timeout_secs = secs;
    }

    if let Some(path) = env.get("DICTIONARY_PATH") {
        config.dictionary.path = PathBuf::from(path);
    }

    // RUST_LOG 优先于 LOG_LEVEL
    if let Some(filter) = env.get("RUST_LOG").or_else(|| env.get("LOG_LEVEL")) {
        config.logging.level = filter;
    }
    if let Some(json) = parse_bool(env, "LOG_JSON")? {
        config.logging.json = json;
    }

    Ok(())
}
