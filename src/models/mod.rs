//! 数据模型

pub mod ollama;
pub mod translation;

pub use ollama::{ContentEvent, OllamaChatChunk, OllamaChatRequest};
pub use translation::{ChatForm, ChatRequest, TranslationDirection, ValidationError};
