//! HTTP 请求处理器

mod chat;
mod pages;

pub use chat::{chat, chat_json, handle_chat, stream_response};
pub use pages::{health, index, index_js};
