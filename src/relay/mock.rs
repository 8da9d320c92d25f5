//! 测试用内存后端

use super::{ByteStream, ChatBackend, RelayError, RelayResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Mutex;

/// 单个 chunk 的脚本
#[derive(Debug, Clone)]
pub enum Step {
    Chunk(&'static str),
    Timeout,
    Transport,
    /// 永远不再产出数据
    Hang,
}

/// 打开流时的行为
#[derive(Debug, Clone)]
pub enum Script {
    Steps(Vec<Step>),
    OpenTimeout,
    OpenUnavailable,
    OpenBadStatus(u16),
}

/// 按脚本回放的后端，并记录收到的 prompt
#[derive(Debug)]
pub struct MockBackend {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn chunks(chunks: &[&'static str]) -> Self {
        Self::new(Script::Steps(
            chunks.iter().copied().map(Step::Chunk).collect(),
        ))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn open_stream(&self, prompt: &str) -> RelayResult<ByteStream> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let steps = match &self.script {
            Script::Steps(steps) => steps.clone(),
            Script::OpenTimeout => return Err(RelayError::timeout("mock connect timeout")),
            Script::OpenUnavailable => {
                return Err(RelayError::unavailable("mock connection refused"))
            }
            Script::OpenBadStatus(status) => {
                return Err(RelayError::bad_status(*status, "mock upstream failure"))
            }
        };

        let stream = futures::stream::iter(steps).then(|step| async move {
            match step {
                Step::Chunk(text) => Ok(Bytes::from_static(text.as_bytes())),
                Step::Timeout => Err(RelayError::timeout("mock read timeout")),
                Step::Transport => Err(RelayError::protocol("mock connection reset")),
                Step::Hang => futures::future::pending().await,
            }
        });
        Ok(Box::pin(stream))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
