//! Ollama `/api/chat` 协议模型

use serde::{Deserialize, Serialize};

/// `POST /api/chat` 请求体
#[derive(Debug, Clone, Serialize)]
pub struct OllamaChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<OllamaMessage<'a>>,
}

impl<'a> OllamaChatRequest<'a> {
    /// 单条 user 消息的请求
    pub fn user(model: &'a str, content: &'a str) -> Self {
        Self {
            model,
            messages: vec![OllamaMessage {
                role: "user",
                content,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OllamaMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// 流式响应中的单行 JSON
///
/// 只关心 `message.content`，其余字段（`done`、`model`、统计信息等）忽略。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OllamaChatChunk {
    #[serde(default)]
    pub message: Option<OllamaChunkMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OllamaChunkMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl OllamaChatChunk {
    /// 非空的 `message.content`
    pub fn into_content(self) -> Option<String> {
        self.message
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
    }
}

/// 下游 SSE 事件负载：`{"content": "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct ContentEvent<'a> {
    pub content: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(OllamaChatRequest::user("llama3.1:8b", "hi")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "llama3.1:8b",
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[test]
    fn test_chunk_content_extraction() {
        let chunk: OllamaChatChunk = serde_json::from_str(
            r#"{"model":"m","message":{"role":"assistant","content":"Wo"},"done":false}"#,
        )
        .unwrap();
        assert_eq!(chunk.into_content().as_deref(), Some("Wo"));

        let done: OllamaChatChunk =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":""},"done":true}"#)
                .unwrap();
        assert_eq!(done.into_content(), None);

        let bare: OllamaChatChunk = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(bare.into_content(), None);
    }
}
