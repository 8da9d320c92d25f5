//! 翻译聊天处理器
//!
//! 校验表单 → 构建词典上下文 → 组装 prompt → 上游流式转发。

use axum::{
    body::Body,
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use tracing::Instrument;

use crate::logger::loggable_input;
use crate::models::{ChatForm, ChatRequest};
use crate::relay::{RelayMode, RelayStream};
use crate::server::{AppState, GatewayError};
use crate::{context, prompt};

/// POST /chat - 纯文本分块响应
pub async fn chat(
    State(state): State<AppState>,
    form: Result<Form<ChatForm>, FormRejection>,
) -> Result<Response, GatewayError> {
    let Form(form) = form?;
    handle_chat(&state, &form.message, &form.direction, RelayMode::Plain).await
}

/// POST /chat_json - SSE 响应
pub async fn chat_json(
    State(state): State<AppState>,
    form: Result<Form<ChatForm>, FormRejection>,
) -> Result<Response, GatewayError> {
    let Form(form) = form?;
    handle_chat(&state, &form.message, &form.direction, RelayMode::Events).await
}

/// 两个聊天端点共用的处理流程
pub async fn handle_chat(
    state: &AppState,
    raw_message: &str,
    raw_direction: &str,
    mode: RelayMode,
) -> Result<Response, GatewayError> {
    let request_id = uuid::Uuid::new_v4().simple().to_string();
    let span = tracing::info_span!("chat", request_id = %request_id, mode = mode.as_str());

    async move {
        let request = ChatRequest::parse(raw_message, raw_direction)?;
        tracing::debug!(
            "[CHAT] 用户输入: {}, 方向: {}",
            loggable_input(request.message()),
            request.direction()
        );

        let annotation =
            context::build(request.message(), request.direction(), &state.dictionary);
        let prompt = prompt::compose(request.message(), &annotation, request.direction());

        let stream = state.relay.stream(&prompt, mode).await?;
        tracing::info!(
            "[CHAT] 开始转发 (backend={}, 上下文词条 {} 个)",
            state.relay.backend_name(),
            annotation.pairs()
        );
        Ok::<_, GatewayError>(stream_response(stream, mode))
    }
    .instrument(span)
    .await
}

/// 构建流式响应
pub fn stream_response(stream: RelayStream, mode: RelayMode) -> Response {
    let content_type = match mode {
        RelayMode::Plain => "text/plain; charset=utf-8",
        RelayMode::Events => "text/event-stream",
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-cache")
        .header("X-Accel-Buffering", "no")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": {"message": "Failed to build stream response"}})),
            )
                .into_response()
        })
}
