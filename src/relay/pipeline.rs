//! 转发管道
//!
//! 上游字节流 → 解码 → 下游帧：
//!
//! ```text
//! Plain : bytes ──> [Utf8Carry]      ──> UpstreamChunk::Text    ──> 原样文本
//! Events: bytes ──> [JsonLineParser] ──> UpstreamChunk::Message ──> data: {"content":"..."}\n\n
//! ```

use super::error::RelayResult;
use super::parser::{JsonLineParser, UpstreamChunk, Utf8Carry};
use crate::models::ContentEvent;
use bytes::Bytes;
use futures::{Stream, StreamExt};

/// 下游输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    /// 纯文本分块
    Plain,
    /// Server-Sent Events
    Events,
}

impl RelayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayMode::Plain => "plain",
            RelayMode::Events => "events",
        }
    }
}

/// 解码器封装
#[derive(Debug)]
enum ChunkDecoder {
    Plain(Utf8Carry),
    Events(JsonLineParser),
}

impl ChunkDecoder {
    fn decode(&mut self, bytes: &[u8]) -> Vec<UpstreamChunk> {
        match self {
            ChunkDecoder::Plain(carry) => text_chunk(carry.push(bytes)),
            ChunkDecoder::Events(parser) => parser.process(bytes),
        }
    }

    fn finish(&mut self) -> Vec<UpstreamChunk> {
        match self {
            ChunkDecoder::Plain(carry) => text_chunk(carry.finish()),
            ChunkDecoder::Events(parser) => parser.finish(),
        }
    }
}

fn text_chunk(text: String) -> Vec<UpstreamChunk> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![UpstreamChunk::Text(text)]
    }
}

/// 单个请求的转发管道
#[derive(Debug)]
pub struct RelayPipeline {
    decoder: ChunkDecoder,
}

impl RelayPipeline {
    pub fn new(mode: RelayMode) -> Self {
        let decoder = match mode {
            RelayMode::Plain => ChunkDecoder::Plain(Utf8Carry::new()),
            RelayMode::Events => ChunkDecoder::Events(JsonLineParser::new()),
        };
        Self { decoder }
    }

    /// 处理单个字节块，返回可以立即发送的帧
    pub fn process_chunk(&mut self, bytes: &[u8]) -> Vec<String> {
        let chunks = self.decoder.decode(bytes);
        frame_all(chunks)
    }

    /// 上游结束，刷出剩余数据
    pub fn finish(&mut self) -> Vec<String> {
        let chunks = self.decoder.finish();
        frame_all(chunks)
    }
}

fn frame_all(chunks: Vec<UpstreamChunk>) -> Vec<String> {
    chunks.into_iter().filter_map(frame).collect()
}

/// 把上游数据单元转换为下游帧
pub fn frame(chunk: UpstreamChunk) -> Option<String> {
    match chunk {
        UpstreamChunk::Text(text) => Some(text),
        UpstreamChunk::Message { content } => sse_event(&content),
    }
}

/// `data: {"content":"..."}\n\n`
pub fn sse_event(content: &str) -> Option<String> {
    match serde_json::to_string(&ContentEvent { content }) {
        Ok(json) => Some(format!("data: {json}\n\n")),
        Err(e) => {
            tracing::warn!("[RELAY] 事件序列化失败: {}", e);
            None
        }
    }
}

/// 创建转发流
///
/// 每收到一个上游字节块就立即产出对应的帧；上游出错时记录日志、产出错误并结束。
pub fn create_relay_stream<S>(
    byte_stream: S,
    mode: RelayMode,
) -> impl Stream<Item = RelayResult<String>> + Send
where
    S: Stream<Item = RelayResult<Bytes>> + Send + 'static,
{
    async_stream::stream! {
        let mut pipeline = RelayPipeline::new(mode);
        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut frames_sent: usize = 0;

        while let Some(result) = byte_stream.next().await {
            match result {
                Ok(bytes) => {
                    tracing::debug!("[RELAY] 收到 {} 字节数据", bytes.len());
                    for frame in pipeline.process_chunk(&bytes) {
                        frames_sent += 1;
                        yield Ok(frame);
                    }
                }
                Err(e) => {
                    tracing::error!(
                        error_type = %e.kind(),
                        "[RELAY] 流式传输中断 (mode={}, 已发送 {} 帧): {}",
                        mode.as_str(),
                        frames_sent,
                        e
                    );
                    yield Err(e);
                    return;
                }
            }
        }

        for frame in pipeline.finish() {
            frames_sent += 1;
            yield Ok(frame);
        }
        tracing::info!("[RELAY] 流结束 (mode={}, 共 {} 帧)", mode.as_str(), frames_sent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayError;

    fn bytes_stream(
        items: Vec<RelayResult<&'static str>>,
    ) -> impl Stream<Item = RelayResult<Bytes>> + Send + 'static {
        futures::stream::iter(
            items
                .into_iter()
                .map(|item| item.map(|s| Bytes::from_static(s.as_bytes()))),
        )
    }

    #[test]
    fn test_sse_event_format() {
        assert_eq!(
            sse_event("Wo").as_deref(),
            Some("data: {\"content\":\"Wo\"}\n\n")
        );
        assert_eq!(
            sse_event("line\n\"q\"").as_deref(),
            Some("data: {\"content\":\"line\\n\\\"q\\\"\"}\n\n")
        );
    }

    #[test]
    fn test_pipeline_plain_passthrough() {
        let mut pipeline = RelayPipeline::new(RelayMode::Plain);
        assert_eq!(
            pipeline.process_chunk(b"{\"message\":{\"content\":\"Wo\"}}\n"),
            vec!["{\"message\":{\"content\":\"Wo\"}}\n".to_string()]
        );
        assert!(pipeline.process_chunk(b"").is_empty());
        assert!(pipeline.finish().is_empty());
    }

    #[test]
    fn test_pipeline_events_skip_garbage() {
        let mut pipeline = RelayPipeline::new(RelayMode::Events);
        let mut frames = Vec::new();
        frames.extend(pipeline.process_chunk(b"{\"message\":{\"content\":\"Wo\"}}\n"));
        frames.extend(pipeline.process_chunk(b"garbage\n"));
        frames.extend(pipeline.process_chunk(b"{\"message\":{\"content\":\"of\"}}\n"));
        frames.extend(pipeline.finish());

        assert_eq!(
            frames,
            vec![
                "data: {\"content\":\"Wo\"}\n\n".to_string(),
                "data: {\"content\":\"of\"}\n\n".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_relay_stream_events() {
        let upstream = bytes_stream(vec![
            Ok("{\"message\":{\"content\":\"Wo\"}}\n"),
            Ok("garbage\n"),
            Ok("{\"message\":{\"content\":\"of\"}}"),
        ]);
        let frames: Vec<String> = create_relay_stream(upstream, RelayMode::Events)
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(
            frames,
            vec![
                "data: {\"content\":\"Wo\"}\n\n".to_string(),
                "data: {\"content\":\"of\"}\n\n".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_relay_stream_stops_after_error() {
        let upstream = bytes_stream(vec![
            Ok("Wo"),
            Err(RelayError::timeout("idle")),
            Ok("never"),
        ]);
        let items: Vec<RelayResult<String>> =
            create_relay_stream(upstream, RelayMode::Plain).collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "Wo");
        assert!(items[1].as_ref().unwrap_err().is_timeout());
    }
}
