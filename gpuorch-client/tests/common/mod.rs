//! In-process stub of the orchestration service

use axum::Router;
use gpuorch_client::OrchestratorClient;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral local port and return a client pointed at it
pub async fn serve(router: Router) -> OrchestratorClient {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub listener");
    let addr = listener.local_addr().expect("stub listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("stub server failed");
    });

    OrchestratorClient::new(format!("http://{}/", addr))
}
