//! DoggoGPT-Mini
//!
//! 英语与 Doggolingo 互译的轻量网关：词典注解 + prompt 组装 + Ollama 流式转发。

pub mod config;
pub mod context;
pub mod dictionary;
pub mod logger;
pub mod models;
pub mod prompt;
pub mod relay;
pub mod server;

pub use config::Config;
pub use dictionary::DictionaryIndex;
pub use models::TranslationDirection;
pub use relay::{OllamaBackend, UpstreamRelay};
pub use server::{build_router, serve, AppState};
