//! 流式读取超时
//!
//! 相邻两个 chunk 之间的间隔超过配置值时，产出 `UpstreamTimeout` 并结束流。

use super::error::{RelayError, RelayResult};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::time::Duration;

/// 给字节流加上空闲读取超时
pub fn with_read_timeout<S>(
    stream: S,
    timeout: Duration,
) -> impl Stream<Item = RelayResult<Bytes>> + Send
where
    S: Stream<Item = RelayResult<Bytes>> + Send + 'static,
{
    async_stream::stream! {
        let mut stream = std::pin::pin!(stream);
        loop {
            match tokio::time::timeout(timeout, stream.next()).await {
                Ok(Some(Ok(bytes))) => yield Ok(bytes),
                Ok(Some(Err(e))) => {
                    yield Err(e);
                    return;
                }
                Ok(None) => return,
                Err(_) => {
                    yield Err(RelayError::timeout(format!(
                        "{}ms 内未收到上游数据",
                        timeout.as_millis()
                    )));
                    return;
                }
            }
        }
    }
}
