use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::rpc::BitcoinRpc;
use crate::server::handlers::{assemble_proof, assemble_recent_proof, health_check, AppState};

pub mod fetch;
pub mod rpc;
pub mod server;

/// SegWit SPV proof assembly service.
#[derive(Parser, Debug, Clone)]
pub struct Config {
    /// Bitcoin Core JSON-RPC endpoint.
    #[arg(long, env = "BITCOIN_RPC_URL", default_value = "http://127.0.0.1:8332")]
    pub rpc_url: String,

    /// RPC username.
    #[arg(long, env = "BITCOIN_RPC_USER")]
    pub rpc_user: String,

    /// RPC password.
    #[arg(long, env = "BITCOIN_RPC_PASS")]
    pub rpc_pass: String,

    /// Port to serve on.
    #[arg(long, env = "PORT", default_value_t = 4455)]
    pub port: u16,

    /// Verifier contract identifier stamped into each bundle.
    #[arg(long, env = "VERIFIER_CONTRACT")]
    pub contract: String,
}

/// Main server entry point
#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();
    let config = Config::parse();

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .pretty()
        .init();

    let state = AppState {
        rpc: BitcoinRpc::new(&config.rpc_url, &config.rpc_user, &config.rpc_pass),
        contract: config.contract.clone(),
    };

    // Build the HTTP router with CORS support
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/proof", post(assemble_proof))
        .route("/proof/recent/:index", get(assemble_recent_proof))
        .with_state(state)
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        );

    // Configure server address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    // Log server startup information
    info!("Server starting on http://{}", addr);
    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
