//! 上游流式转发层
//!
//! 向本地推理服务发起流式请求，并在不缓冲完整响应的前提下，
//! 把上游数据重新编排成下游需要的格式。
//!
//! # 架构设计
//!
//! ```text
//! prompt ──> [ChatBackend] ──> ByteStream ──> [RelayPipeline] ──> 下游帧
//!
//! OllamaBackend ──> NDJSON 字节流 ──> Plain  : 原样文本分块
//!                                 └─> Events : data: {"content":"..."}\n\n
//! ```
//!
//! # 首字节预取
//!
//! `UpstreamRelay` 在把流交给网关之前先等待上游的第一个 chunk：
//! 首字节之前发生的超时/连接错误仍以 `Err` 返回，网关可以据此给出正确的状态码，
//! 且不会产生半截响应体。预取的 chunk 会作为第一帧重新发出。
//!
//! 首字节之后的错误只能记录日志并中断响应体，不做重试。

mod backend;
mod error;
mod parser;
mod pipeline;
mod timeout;

#[cfg(test)]
pub(crate) mod mock;


pub use backend::{build_chat_url, ByteStream, ChatBackend, OllamaBackend};
pub use error::{RelayError, RelayResult};
pub use parser::{JsonLineParser, UpstreamChunk, Utf8Carry};
pub use pipeline::{create_relay_stream, frame, sse_event, RelayMode, RelayPipeline};
pub use timeout::with_read_timeout;

use futures::{stream, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

/// 下游帧流
pub type RelayStream = Pin<Box<dyn Stream<Item = RelayResult<String>> + Send>>;

/// 上游转发器
#[derive(Clone)]
pub struct UpstreamRelay {
    backend: Arc<dyn ChatBackend>,
}

impl UpstreamRelay {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// 纯文本转发
    pub async fn stream_plain(&self, prompt: &str) -> RelayResult<RelayStream> {
        self.stream(prompt, RelayMode::Plain).await
    }

    /// SSE 事件转发
    pub async fn stream_events(&self, prompt: &str) -> RelayResult<RelayStream> {
        self.stream(prompt, RelayMode::Events).await
    }

    pub async fn stream(&self, prompt: &str, mode: RelayMode) -> RelayResult<RelayStream> {
        let upstream = self.open_primed(prompt).await?;
        Ok(Box::pin(create_relay_stream(upstream, mode)))
    }

    /// 打开上游流并等待第一个 chunk
    async fn open_primed(&self, prompt: &str) -> RelayResult<ByteStream> {
        let mut upstream = self.backend.open_stream(prompt).await?;

        match upstream.next().await {
            Some(Ok(first)) => {
                tracing::debug!(
                    "[RELAY] {} 首个 chunk 到达 ({} 字节)",
                    self.backend.name(),
                    first.len()
                );
                Ok(Box::pin(stream::once(async move { Ok(first) }).chain(upstream)))
            }
            Some(Err(e)) => Err(e),
            None => {
                tracing::warn!("[RELAY] {} 返回了空响应体", self.backend.name());
                Ok(Box::pin(stream::empty()))
            }
        }
    }
}

impl std::fmt::Debug for UpstreamRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamRelay")
            .field("backend", &self.backend.name())
            .finish()
    }
}
