//! Rewrites axum's plain-text extractor rejections into the JSON envelope.

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Rejection bodies are short; anything larger is already ours.
const MAX_REJECTION_BODY: usize = 64 * 1024;

fn guess_path(msg: &str) -> Option<String> {
    ["question", "source", "company", "year", "files"]
        .into_iter()
        .find(|key| msg.contains(key))
        .map(str::to_string)
}

fn hint_for(status: StatusCode, msg: &str) -> Option<String> {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        Some("Upload fewer or smaller files (see MAX_UPLOAD_BYTES).".into())
    } else if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
        Some("Send JSON with `Content-Type: application/json`, or multipart/form-data for uploads.".into())
    } else if msg.contains("missing field") {
        Some("Expected a JSON object like { \"question\": \"...\" }.".into())
    } else {
        None
    }
}

fn ensure_request_id(parts: &mut axum::http::response::Parts) {
    if parts.headers.contains_key("X-Request-Id") {
        return;
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    if let Ok(v) = HeaderValue::from_str(&format!("req-{nanos}")) {
        parts.headers.insert("X-Request-Id", v);
    }
}

fn is_json(parts: &axum::http::response::Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    let mapped = [
        StatusCode::BAD_REQUEST,
        StatusCode::PAYLOAD_TOO_LARGE,
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        StatusCode::UNPROCESSABLE_ENTITY,
    ];
    if !mapped.contains(&status) {
        return res;
    }

    let (mut parts, body) = res.into_parts();
    if is_json(&parts) {
        return Response::from_parts(parts, body);
    }
    let bytes: Bytes = axum::body::to_bytes(body, MAX_REJECTION_BODY)
        .await
        .unwrap_or_default();
    let original = String::from_utf8_lossy(&bytes);
    ensure_request_id(&mut parts);

    let code = match status {
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        _ => "BAD_REQUEST",
    };
    let envelope = ApiResponse::<()>::error(
        code,
        original.trim(),
        vec![ApiErrorDetail {
            path: guess_path(&original),
            hint: hint_for(status, &original),
        }],
    );

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(body))
}
