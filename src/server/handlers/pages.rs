//! 静态页面与健康检查

use axum::{
    http::header,
    response::{Html, IntoResponse},
};

const INDEX_HTML: &str = include_str!("../../../static/index.html");
const INDEX_JS: &str = include_str!("../../../static/js/index.js");

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/js/index.js
pub async fn index_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        INDEX_JS,
    )
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
