use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use segwit_proof::{assemble, SegwitData};

use crate::fetch::{fetch_proof_input, fetch_recent};
use crate::rpc::BitcoinRpc;

/// Shared service state.
#[derive(Clone)]
pub struct AppState {
    pub rpc: BitcoinRpc,
    /// Verifier contract identifier stamped into every bundle.
    pub contract: String,
}

/// Request structure for proof assembly
#[derive(Deserialize, Debug)]
pub struct ProofRequest {
    /// Target transaction id (display-order hex)
    pub txid: String,
    /// Hash of the block containing it
    pub blockhash: String,
}

/// Response structure for proof assembly
#[derive(Serialize, Debug)]
pub struct ProofResponse {
    /// Success status
    pub success: bool,
    /// Error message if any
    pub error: Option<String>,
    /// The assembled proof bundle
    pub data: Option<SegwitData>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint for monitoring service status
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Assemble a SegWit SPV proof bundle for one transaction
pub async fn assemble_proof(
    State(state): State<AppState>,
    Json(request): Json<ProofRequest>,
) -> Result<Json<ProofResponse>, StatusCode> {
    info!(
        "Received proof request for txid: {} in block: {}",
        request.txid, request.blockhash
    );

    let input = match fetch_proof_input(&state.rpc, &request.txid, &request.blockhash).await {
        Ok(input) => input,
        Err(e) => {
            warn!("Fetch failed for {}: {:#}", request.txid, e);
            return Ok(Json(ProofResponse {
                success: false,
                error: Some(format!("{e:#}")),
                data: None,
            }));
        }
    };

    match assemble(&input, &state.contract) {
        Ok(data) => {
            info!(
                "Assembled proof for {} at index {} (depth {})",
                request.txid, data.tx_index, data.tree_depth
            );
            Ok(Json(ProofResponse {
                success: true,
                error: None,
                data: Some(data),
            }))
        }
        Err(e) => {
            warn!("Proof assembly failed for {}: {}", request.txid, e);
            Ok(Json(ProofResponse {
                success: false,
                error: Some(e.to_string()),
                data: None,
            }))
        }
    }
}

/// Assemble a proof for the transaction at `index` of the current best
/// block; a probing convenience for live nodes
pub async fn assemble_recent_proof(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<ProofResponse>, StatusCode> {
    info!("Received proof request for best-block transaction {}", index);

    let input = match fetch_recent(&state.rpc, index).await {
        Ok(input) => input,
        Err(e) => {
            warn!("Fetch failed for best-block index {}: {:#}", index, e);
            return Ok(Json(ProofResponse {
                success: false,
                error: Some(format!("{e:#}")),
                data: None,
            }));
        }
    };

    match assemble(&input, &state.contract) {
        Ok(data) => Ok(Json(ProofResponse {
            success: true,
            error: None,
            data: Some(data),
        })),
        Err(e) => {
            warn!("Proof assembly failed for best-block index {}: {}", index, e);
            Ok(Json(ProofResponse {
                success: false,
                error: Some(e.to_string()),
                data: None,
            }))
        }
    }
}
