//! HTTP server module
//!
//! Serves the session snapshot and accepts log lines from other processes.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::oneshot;

use super::{LogRequest, LogResponse};
use crate::logging::{Dispatcher, Routes, Severity};
use crate::{log_debug, log_info, log_warning};

/// Handle to control the running server
pub struct ServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    addr: SocketAddr,
}

impl ServerHandle {
    /// Get the address the server is listening on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shutdown the server gracefully
    pub fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Ignore error if receiver is already dropped
            let _ = tx.send(());
        }
        Ok(())
    }
}

/// Routes served by the log server
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/session", get(session_handler))
        .route("/log", post(log_handler))
        .with_state(dispatcher)
}

/// Start the log server on 127.0.0.1
///
/// # Arguments
/// * `port` - Port to listen on (0 lets the OS pick)
/// * `dispatcher` - Dispatcher receiving posted lines
///
/// # Returns
/// A `ServerHandle` that can be used to shut down the server
pub async fn start(port: u16, dispatcher: Arc<Dispatcher>) -> Result<ServerHandle> {
    let app = router(Arc::clone(&dispatcher));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    log_info!(dispatcher, "Log server listening on %s", bound_addr.to_string());

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
                log_info!(dispatcher, routes = Routes::SAVE_SESSION, "Log server shutting down");
            })
            .await
            .ok();
    });

    Ok(ServerHandle {
        shutdown_tx: Some(shutdown_tx),
        addr: bound_addr,
    })
}

/// GET /health
async fn health_handler() -> &'static str {
    "ok"
}

/// GET /session
///
/// Returns the session buffer as plain text.
async fn session_handler(State(dispatcher): State<Arc<Dispatcher>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        dispatcher.session_contents(),
    )
}

/// POST /log
///
/// Emits the posted line through the dispatcher.
async fn log_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(request): Json<LogRequest>,
) -> (StatusCode, Json<LogResponse>) {
    let severity = match request.severity.parse::<Severity>() {
        Ok(severity) => severity,
        Err(e) => {
            log_warning!(dispatcher, "Invalid log request: %s", e.to_string());
            return (
                StatusCode::BAD_REQUEST,
                Json(LogResponse::error("Invalid JSON", e.to_string())),
            );
        }
    };

    log_debug!(
        dispatcher,
        routes = Routes::SAVE,
        "Remote %s line from %s routed to %s",
        severity.as_str(),
        request.origin(),
        request.routes().to_string()
    );
    dispatcher.emit(
        severity,
        request.origin(),
        &request.message,
        request.routes(),
    );

    (StatusCode::OK, Json(LogResponse::success()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::CapturedOutput;
    use crate::logging::DispatcherSettings;
    use axum::{body::Body, http::Request};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_dispatcher(dir: &TempDir) -> Arc<Dispatcher> {
        Arc::new(Dispatcher::with_console(
            DispatcherSettings {
                output_dir: dir.path().to_path_buf(),
                ..DispatcherSettings::default()
            },
            CapturedOutput::default().console(),
        ))
    }

    fn post_log(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/log")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let temp_dir = TempDir::new().unwrap();
        let app = router(test_dispatcher(&temp_dir));

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_log_then_read_session() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = test_dispatcher(&temp_dir);
        let app = router(Arc::clone(&dispatcher));

        let response = app
            .clone()
            .oneshot(post_log(
                r#"{"severity":"info","origin":"uploader","message":"stored 3 records","routes":["session"]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"status":"success"}"#);

        let request = Request::builder().uri("/session").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let expected = format!(
            "{}stored 3 records\n",
            dispatcher.formatter().build_prefix(Severity::Info, "uploader")
        );
        assert_eq!(body_text(response).await, expected);
    }

    #[tokio::test]
    async fn test_unknown_severity_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = test_dispatcher(&temp_dir);
        let app = router(Arc::clone(&dispatcher));

        let response = app
            .oneshot(post_log(r#"{"severity":"loud","message":"x"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: LogResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body.status, "error");
        assert_eq!(body.details.as_deref(), Some("unknown severity 'loud'"));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let app = router(test_dispatcher(&temp_dir));

        let response = app.oneshot(post_log("not valid json")).await.unwrap();
        // Axum returns 400 Bad Request for JSON syntax errors
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_message() {
        let temp_dir = TempDir::new().unwrap();
        let app = router(test_dispatcher(&temp_dir));

        let response = app
            .oneshot(post_log(r#"{"severity":"info"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_server_starts_on_port() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = test_dispatcher(&temp_dir);

        // Use port 0 to let OS assign an available port
        let handle = start(0, Arc::clone(&dispatcher)).await.unwrap();

        assert!(handle.addr().port() > 0);
        assert!(dispatcher.session_contents().contains("Log server listening on 127.0.0.1:"));
        handle.shutdown().unwrap();
    }

    #[tokio::test]
    async fn test_server_shutdown() {
        let temp_dir = TempDir::new().unwrap();
        let handle = start(0, test_dispatcher(&temp_dir)).await.unwrap();
        let addr = handle.addr();

        // Server should be running
        assert!(tokio::net::TcpStream::connect(addr).await.is_ok());

        handle.shutdown().unwrap();

        // Give server time to shut down
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // Server should be stopped (connection refused)
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }
}
