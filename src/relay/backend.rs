//! 上游推理服务调用层
//!
//! 后端层只负责发起 HTTP 请求、返回字节流，不做任何格式转换。

use super::error::{RelayError, RelayResult};
use super::timeout::with_read_timeout;
use crate::config::UpstreamConfig;
use crate::logger::safe_truncate;
use crate::models::OllamaChatRequest;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client;
use std::pin::Pin;
use std::time::Duration;

/// 非成功响应体最多读取的字节数
const ERROR_BODY_LIMIT: usize = 4 * 1024;

/// 上游字节流
pub type ByteStream = Pin<Box<dyn Stream<Item = RelayResult<Bytes>> + Send>>;

/// 聊天后端
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// 发起流式调用
    ///
    /// 返回 `Ok` 时上游已经给出成功状态码；之后的读取错误通过流中的 `Err` 传递。
    async fn open_stream(&self, prompt: &str) -> RelayResult<ByteStream>;

    /// 后端名称，用于日志
    fn name(&self) -> &'static str;
}

/// Ollama `/api/chat` 后端
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: Client,
    chat_url: String,
    model: String,
    read_timeout: Duration,
}

impl OllamaBackend {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            chat_url: build_chat_url(&config.base_url),
            model: config.model.clone(),
            read_timeout: config.read_timeout(),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// `{base_url}/api/chat`，容忍结尾的 `/`
pub fn build_chat_url(base_url: &str) -> String {
    format!("{}/api/chat", base_url.trim_end_matches('/'))
}

/// 读取字节流的前 `limit` 个字节，读取出错时保留已读部分
async fn read_capped<S, E>(stream: S, limit: usize) -> String
where
    S: Stream<Item = Result<Bytes, E>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut body = Vec::new();
    while body.len() < limit {
        match stream.next().await {
            Some(Ok(chunk)) => {
                let take = chunk.len().min(limit - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            _ => break,
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    async fn open_stream(&self, prompt: &str) -> RelayResult<ByteStream> {
        let body = OllamaChatRequest::user(&self.model, prompt);
        tracing::debug!("[OLLAMA] POST {} model={}", self.chat_url, self.model);

        let send = self.client.post(&self.chat_url).json(&body).send();
        let resp = tokio::time::timeout(self.read_timeout, send)
            .await
            .map_err(|_| {
                RelayError::timeout(format!(
                    "{}ms 内未收到 {} 的响应",
                    self.read_timeout.as_millis(),
                    self.chat_url
                ))
            })??;

        let status = resp.status();
        if !status.is_success() {
            let body = tokio::time::timeout(
                self.read_timeout,
                read_capped(resp.bytes_stream(), ERROR_BODY_LIMIT),
            )
            .await
            .unwrap_or_default();
            let snippet = safe_truncate(&body, 200);
            tracing::warn!("[OLLAMA] 上游返回 {}: {}", status, snippet);
            return Err(RelayError::bad_status(status.as_u16(), &snippet));
        }

        let stream = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(RelayError::from_reqwest));
        Ok(Box::pin(with_read_timeout(stream, self.read_timeout)))
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
