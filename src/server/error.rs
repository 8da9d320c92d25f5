//! 网关错误
//!
//! 错误种类到 HTTP 状态码的映射只在这里进行。

use crate::models::ValidationError;
use crate::relay::RelayError;
use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// 网关错误
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 客户端参数错误
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 表单体无法解析（重复字段、非表单 Content-Type、超出大小限制等）
    #[error("请求表单无效: {0}")]
    MalformedForm(#[from] FormRejection),

    /// 上游转发失败
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl GatewayError {
    /// 获取对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::MalformedForm(rejection)
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            GatewayError::MalformedForm(_) => StatusCode::BAD_REQUEST,
            GatewayError::Relay(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取错误类型字符串
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Validation(ValidationError::EmptyMessage) => "empty_message",
            GatewayError::Validation(ValidationError::InvalidDirection(_)) => "invalid_direction",
            GatewayError::MalformedForm(rejection)
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                "payload_too_large"
            }
            GatewayError::MalformedForm(_) => "malformed_form",
            GatewayError::Relay(e) => e.kind(),
        }
    }

    /// 返回给客户端的消息
    ///
    /// 上游错误的根因只写日志，不透传给客户端。
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::Validation(e) => e.to_string(),
            GatewayError::MalformedForm(rejection) => rejection.body_text(),
            GatewayError::Relay(e) if e.is_timeout() => {
                "the translation service did not respond in time".to_string()
            }
            GatewayError::Relay(_) => "the translation service failed".to_string(),
        }
    }

    /// 转换为 JSON 错误响应
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "message": self.client_message(),
                "type": self.error_type(),
                "code": self.status_code().as_u16()
            }
        })
    }

    /// 按严重程度记录日志
    pub fn log(&self) {
        match self {
            GatewayError::Validation(e) => {
                tracing::info!(error_type = %self.error_type(), "[CHAT] 请求校验失败: {}", e);
            }
            GatewayError::MalformedForm(rejection) => {
                tracing::info!(
                    error_type = %self.error_type(),
                    "[CHAT] 表单解析失败: {}",
                    rejection.body_text()
                );
            }
            GatewayError::Relay(e) => {
                tracing::error!(
                    error_type = %self.error_type(),
                    status = self.status_code().as_u16(),
                    "[CHAT] 上游调用失败: {}",
                    e
                );
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
