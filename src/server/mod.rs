//! HTTP 服务
//!
//! 路由、跨域、请求体限制与优雅退出。

mod error;
pub mod handlers;


pub use error::GatewayError;

use crate::config::ServerConfig;
use crate::dictionary::DictionaryIndex;
use crate::relay::UpstreamRelay;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// 应用状态
///
/// 启动时构建一次，每个请求克隆一份；内部都是只读的共享数据。
#[derive(Debug, Clone)]
pub struct AppState {
    pub dictionary: Arc<DictionaryIndex>,
    pub relay: Arc<UpstreamRelay>,
}

impl AppState {
    pub fn new(dictionary: DictionaryIndex, relay: UpstreamRelay) -> Self {
        Self {
            dictionary: Arc::new(dictionary),
            relay: Arc::new(relay),
        }
    }
}

/// 构建路由
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/static/js/index.js", get(handlers::index_js))
        .route("/chat", post(handlers::chat))
        .route("/chat_json", post(handlers::chat_json))
        .route("/health", get(handlers::health))
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes));

    if let Some(cors) = cors_layer(&config.cors_allowed_origins) {
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// 根据配置创建 CORS 层，未配置来源时返回 `None`
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return Some(layer.allow_origin(Any));
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("[SERVER] 忽略无效的 CORS 来源: {}", origin);
                None
            }
        })
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(layer.allow_origin(values))
}

/// 启动 HTTP 服务，直到收到退出信号
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("[SERVER] 监听 http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("[SERVER] 已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("[SERVER] 无法监听 Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("[SERVER] 无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("[SERVER] 收到退出信号，等待进行中的请求结束");
}
