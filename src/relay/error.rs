//! 上游转发错误
//!
//! 只描述错误种类，不关心 HTTP 状态码映射（由网关层负责）。

use std::error::Error as StdError;
use thiserror::Error;

/// 转发结果类型
pub type RelayResult<T> = Result<T, RelayError>;

/// 上游转发错误
#[derive(Debug, Error)]
pub enum RelayError {
    /// 连接或读取超时
    #[error("上游请求超时: {message}")]
    UpstreamTimeout { message: String },

    /// 连接被拒绝、DNS 解析失败等
    #[error("上游服务不可用: {message}")]
    UpstreamUnavailable { message: String },

    /// 非 2xx 状态码或其他传输错误
    #[error("上游协议错误: {message}")]
    UpstreamProtocolError {
        message: String,
        status: Option<u16>,
    },
}

impl RelayError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::UpstreamTimeout {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::UpstreamProtocolError {
            message: message.into(),
            status: None,
        }
    }

    /// 上游返回了非成功状态码
    pub fn bad_status(status: u16, body: &str) -> Self {
        Self::UpstreamProtocolError {
            message: format!("HTTP {status}: {body}"),
            status: Some(status),
        }
    }

    /// 按 reqwest 错误性质分类
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let message = error_chain(&err);
        if err.is_timeout() {
            Self::timeout(message)
        } else if err.is_connect() {
            Self::unavailable(message)
        } else {
            Self::protocol(message)
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::UpstreamTimeout { .. })
    }

    /// 错误种类标签，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpstreamTimeout { .. } => "upstream_timeout",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::UpstreamProtocolError { .. } => "upstream_protocol_error",
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_reqwest(err)
    }
}

/// reqwest 的 Display 不包含底层原因，这里把整条 source 链拼起来
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
