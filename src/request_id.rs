use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_CLIENT_ID_LEN: usize = 64;

tokio::task_local! {
    static CURRENT: String;
}

/// 当前请求的 id；不在请求上下文中时为 None
pub fn current_request_id() -> Option<String> {
    CURRENT.try_with(Clone::clone).ok()
}

/// 客户端传入的 id 只接受短的 `[A-Za-z0-9._-]`，否则重新生成
fn accept_client_id(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    let ok = !raw.is_empty()
        && raw.len() <= MAX_CLIENT_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    ok.then_some(raw)
}

fn request_id_for(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(accept_client_id)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

/// 为每个请求分配 id：写入 tracing span 与响应头，错误日志据此关联请求
pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let id = request_id_for(&req);
    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut res = CURRENT
        .scope(id.clone(), next.run(req).instrument(span))
        .await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}
