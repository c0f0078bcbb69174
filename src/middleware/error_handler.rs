use axum::{
    body::{Body, to_bytes},
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::error;

const MAX_LOGGED_BODY: usize = 16 * 1024;

/// Logs every 5xx answer with the request line and the body that was sent.
/// The client always receives the full body; only the log line is cut.
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            error!(%method, %path, status = %parts.status, "failed to read error body: {}", e);
            parts.headers.remove(header::CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let logged = &bytes[..bytes.len().min(MAX_LOGGED_BODY)];
    error!(
        %method,
        %path,
        status = %parts.status,
        body = %String::from_utf8_lossy(logged),
        truncated = bytes.len() > MAX_LOGGED_BODY,
        "request failed"
    );

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use tower::ServiceExt;

    async fn oversized_failure() -> (StatusCode, String) {
        (StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(MAX_LOGGED_BODY * 2))
    }

    async fn ok() -> &'static str {
        "fine"
    }

    fn app() -> Router {
        Router::new()
            .route("/big", get(oversized_failure))
            .route("/ok", get(ok))
            .layer(axum::middleware::from_fn(log_errors))
    }

    async fn body_len(uri: &str) -> (StatusCode, usize) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.len())
    }

    #[tokio::test]
    async fn large_error_body_reaches_the_client_whole() {
        let (status, len) = body_len("/big").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(len, MAX_LOGGED_BODY * 2);
    }

    #[tokio::test]
    async fn success_passes_through() {
        let (status, len) = body_len("/ok").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(len, 4);
    }
}
