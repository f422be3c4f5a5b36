//! Access log plus `X-Request-Id` / `X-Process-Time` response headers.

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::info;
use uuid::Uuid;

pub const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const PROCESS_TIME: HeaderName = HeaderName::from_static("x-process-time");

/// Reuses a non-empty incoming `X-Request-Id`, otherwise mints a UUID.
fn request_id(req: &Request<Body>) -> HeaderValue {
    req.headers()
        .get(&REQUEST_ID)
        .filter(|v| v.to_str().is_ok_and(|s| !s.trim().is_empty()))
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        })
}

pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let id = request_id(&req);

    let mut res = next.run(req).await;

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        method = %method,
        path = %path,
        status = res.status().as_u16(),
        elapsed_s = %format!("{elapsed:.2}"),
        request_id = id.to_str().unwrap_or_default(),
        "request served"
    );

    let headers = res.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&elapsed.to_string()) {
        headers.insert(PROCESS_TIME, v);
    }
    headers.insert(REQUEST_ID, id);
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_caller_request_id() {
        let req = Request::builder()
            .header("X-Request-Id", "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id(&req), "abc-123");
    }

    #[test]
    fn mints_uuid_when_missing_or_blank() {
        let req = Request::builder()
            .header("X-Request-Id", "  ")
            .body(Body::empty())
            .unwrap();
        let id = request_id(&req);
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }
}
