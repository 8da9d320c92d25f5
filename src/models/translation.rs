//! 翻译方向与聊天请求模型

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 翻译方向
///
/// 决定 ContextBuilder 查询哪一张词典表，以及 PromptComposer 选用哪一段指令模板。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranslationDirection {
    /// English -> Doggolingo
    #[serde(rename = "eng_to_doggo")]
    EnglishToDoggo,
    /// Doggolingo -> English
    #[serde(rename = "doggo_to_eng")]
    DoggoToEnglish,
}

impl TranslationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationDirection::EnglishToDoggo => "eng_to_doggo",
            TranslationDirection::DoggoToEnglish => "doggo_to_eng",
        }
    }
}

impl std::str::FromStr for TranslationDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "eng_to_doggo" => Ok(TranslationDirection::EnglishToDoggo),
            "doggo_to_eng" => Ok(TranslationDirection::DoggoToEnglish),
            _ => Err(ValidationError::InvalidDirection(s.to_string())),
        }
    }
}

impl std::fmt::Display for TranslationDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 请求校验错误（客户端错误）
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// 消息为空或只包含空白字符
    #[error("message must not be empty")]
    EmptyMessage,

    /// 不支持的翻译方向
    #[error("invalid translation direction: {0:?}")]
    InvalidDirection(String),
}

/// 经过校验的聊天请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    message: String,
    direction: TranslationDirection,
}

impl ChatRequest {
    /// 从原始表单字段构建请求
    ///
    /// 先校验消息，再校验方向：两个字段都无效时返回 `EmptyMessage`。
    pub fn parse(raw_message: &str, raw_direction: &str) -> Result<Self, ValidationError> {
        let message = raw_message.trim();
        if message.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        let direction = raw_direction.parse()?;
        Ok(Self {
            message: message.to_string(),
            direction,
        })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn direction(&self) -> TranslationDirection {
        self.direction
    }
}

/// `/chat` 与 `/chat_json` 的表单字段
///
/// 字段缺失时按空字符串处理，由 [`ChatRequest::parse`] 统一给出校验错误。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub direction: String,
}
