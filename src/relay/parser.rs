//! 上游字节流解码器
//!
//! - `Utf8Carry`: 原始文本模式，处理跨 chunk 截断的多字节 UTF-8 序列
//! - `JsonLineParser`: NDJSON 模式，只缓冲最后一行未结束的数据

use crate::logger::safe_truncate;
use crate::models::OllamaChatChunk;

/// 上游数据单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamChunk {
    /// 原始文本片段（纯文本模式）
    Text(String),
    /// 结构化行中的 `message.content`（事件模式）
    Message { content: String },
}

/// UTF-8 增量解码器
///
/// 一个 chunk 末尾不完整的多字节序列留到下一个 chunk 再解码；
/// 真正非法的字节以 U+FFFD 替换。
#[derive(Debug, Default)]
pub struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解码一个 chunk，返回当前可以输出的文本
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::with_capacity(self.pending.len());
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        // 末尾序列不完整，等待后续字节
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = rest.to_vec();
        out
    }

    /// 流结束时输出剩余字节
    pub fn finish(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        out
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// 单行未结束数据的缓冲上限
pub const MAX_PENDING_LINE_BYTES: usize = 1024 * 1024;

/// NDJSON 行解析器
#[derive(Debug)]
pub struct JsonLineParser {
    buffer: Vec<u8>,
    max_line_bytes: usize,
    /// 当前行已超过上限，丢弃到下一个换行为止
    discarding: bool,
    /// 跳过的非法行数
    skipped: usize,
}

impl Default for JsonLineParser {
    fn default() -> Self {
        Self::with_max_line_bytes(MAX_PENDING_LINE_BYTES)
    }
}

impl JsonLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line_bytes,
            discarding: false,
            skipped: 0,
        }
    }

    /// 处理一个 chunk，返回其中所有完整行产生的消息
    pub fn process(&mut self, bytes: &[u8]) -> Vec<UpstreamChunk> {
        self.buffer.extend_from_slice(bytes);

        let mut chunks = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            if self.discarding {
                self.discarding = false;
            } else if let Some(chunk) = self.parse_line(start, end) {
                chunks.push(chunk);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);

        if self.buffer.len() > self.max_line_bytes {
            if !self.discarding {
                self.skipped += 1;
                tracing::warn!(
                    "[RELAY] 上游单行超过 {} 字节仍未结束，丢弃该行",
                    self.max_line_bytes
                );
            }
            self.buffer.clear();
            self.discarding = true;
        }
        chunks
    }

    /// 流结束时解析最后一行（没有换行结尾的情况）
    pub fn finish(&mut self) -> Vec<UpstreamChunk> {
        if self.discarding {
            self.discarding = false;
            self.buffer.clear();
            return Vec::new();
        }
        let end = self.buffer.len();
        let chunk = self.parse_line(0, end);
        self.buffer.clear();
        chunk.into_iter().collect()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse_line(&mut self, start: usize, end: usize) -> Option<UpstreamChunk> {
        let line = self.buffer[start..end].trim_ascii();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_slice::<OllamaChatChunk>(line) {
            Ok(chunk) => chunk
                .into_content()
                .map(|content| UpstreamChunk::Message { content }),
            Err(e) => {
                self.skipped += 1;
                tracing::warn!(
                    "[RELAY] 跳过无法解析的上游行: {} ({})",
                    safe_truncate(&String::from_utf8_lossy(line), 200),
                    e
                );
                None
            }
        }
    }
}
