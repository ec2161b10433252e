//! Liveness endpoint
//!
//! One unauthenticated GET returning a fixed string. Hosting platforms poll
//! it to decide the manager is alive; it says nothing about deployments.

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{Level, event};

use crate::domain::{constant::health, error::HosterError};

const LIVENESS_REPLY: &str = "Manager Bot Running 🚀";

fn router() -> Router {
    Router::new().route("/", get(|| async { LIVENESS_REPLY }))
}

/// Bind the configured port. Kept separate from [`serve`] so bind failures
/// surface as a fatal startup error before the gateway opens.
pub async fn bind(port: u16) -> Result<TcpListener, HosterError> {
    TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| HosterError::Configuration(format!("Failed to bind health port {port}: {e}")))
}

/// Serve the liveness route until cancelled.
pub async fn serve(listener: TcpListener, cancel: CancellationToken) -> Result<(), HosterError> {
    let addr = listener.local_addr().map_err(HosterError::from)?;
    event!(Level::INFO, event = health::SERVER_STARTED, addr = %addr);

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| HosterError::Generic(format!("Health server error: {e}")))?;

    event!(Level::INFO, event = health::SERVER_STOPPED);
    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    #[tokio::test]
    async fn liveness_route_answers_with_fixed_string() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cancel = CancellationToken::new();
        let server = tokio::spawn(serve(listener, cancel.clone()));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("Manager Bot Running"));

        cancel.cancel();
        server.await.unwrap().unwrap();
    }
}
