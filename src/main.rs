use anyhow::Context;
use doggo_gpt_lib::{
    config::Config, logger, server, AppState, DictionaryIndex, OllamaBackend, UpstreamRelay,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("加载配置失败")?;
    logger::init_tracing(&config.logging)?;

    let dictionary = DictionaryIndex::load(&config.dictionary.path).with_context(|| {
        format!("加载词典失败: {}", config.dictionary.path.display())
    })?;

    let backend = OllamaBackend::new(&config.upstream).context("创建上游客户端失败")?;
    tracing::info!(
        "[MAIN] 上游 {} (model={})",
        backend.chat_url(),
        backend.model()
    );

    let relay = UpstreamRelay::new(Arc::new(backend));
    let state = AppState::new(dictionary, relay);

    server::serve(state, &config.server).await
}
