use axum::{
    body::{Bytes, to_bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    response::{JsonApiResponse, log_app_error},
};

const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Rewrites plain-text error responses (extractor rejections, 404 fallbacks,
/// 405s) into the JSON envelope. JSON and HTML responses pass through.
pub async fn json_error_middleware(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let status = response.status();

    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    if content_type_contains(response.headers(), &["application/json", "+json", "text/html"]) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let message = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => body_bytes_to_message(status, bytes),
        Err(_) => default_message(status),
    };
    let app_error = app_error_from_status(status, message);
    if status.is_server_error() {
        log_app_error(&app_error, status);
    }

    let mut rewritten = JsonApiResponse::from_error(&app_error).into_response();
    // keep the original code, e.g. 405 or 413, rather than the variant's default
    *rewritten.status_mut() = status;
    for (name, value) in &parts.headers {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        rewritten.headers_mut().insert(name.clone(), value.clone());
    }
    rewritten
}

fn content_type_contains(headers: &HeaderMap, needles: &[&str]) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let value = value.to_ascii_lowercase();
            needles.iter().any(|needle| value.contains(needle))
        })
        .unwrap_or(false)
}

fn body_bytes_to_message(status: StatusCode, bytes: Bytes) -> String {
    let message = String::from_utf8_lossy(&bytes).trim().to_string();
    if message.is_empty() {
        return default_message(status);
    }
    message
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

fn app_error_from_status(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::unauthorized(message),
        StatusCode::FORBIDDEN => AppError::forbidden(message),
        StatusCode::NOT_FOUND => AppError::not_found(message),
        StatusCode::CONFLICT => AppError::conflict(message),
        _ if status.is_client_error() => AppError::bad_request(message),
        _ => AppError::internal(message),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        body::{self, Body},
        http::{Request, StatusCode},
        middleware,
        routing::post,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::json_error_middleware;

    #[derive(Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        title: String,
    }

    async fn accepts_payload(Json(_): Json<Payload>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .route("/lists", post(accepts_payload))
            .layer(middleware::from_fn(json_error_middleware))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.expect("request should complete");
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn extractor_rejection_becomes_json_envelope() {
        let (status, json) = send(
            Request::builder()
                .method("POST")
                .uri("/lists")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["success"], false);
        assert!(json["message"].as_str().is_some_and(|m| m.contains("title")));
    }

    #[tokio::test]
    async fn unknown_route_becomes_json_not_found() {
        let (status, json) = send(
            Request::builder()
                .uri("/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], 404);
        assert_eq!(json["message"], "Not Found");
    }
}
