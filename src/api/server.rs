//! Axum application for the indexer's REST surface (spec §6): liveness,
//! sync status, scan requests, and Merkle-proof lookups. Grounded on the
//! teacher's `api.rs`/`stealth/api.rs` pattern of a `State<SharedAppState>`
//! extractor wrapping a service behind a lock, a CORS-open router, and a
//! plain JSON error body.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::announcement::Announcement;
use crate::api::middleware::{
    create_rate_limiter, rate_limit_middleware, security_headers_middleware, validate_amount_sats,
    validate_hex, RateLimitState,
};
use crate::curve::{CurvePoint, Scalar};
use crate::field::FieldElement;
use crate::indexer::{ChainReader, IndexerService};
use crate::keys::stealth::MAX_AMOUNT_SATS;

pub struct AppState {
    pub indexer: Arc<IndexerService>,
    /// Absent when the indexer is run against a static fixture (tests, or
    /// a purely local scan-only deployment) rather than a live chain.
    pub chain_reader: Option<Arc<dyn ChainReader>>,
    pub rate_limiter: RateLimitState,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub fn new(indexer: Arc<IndexerService>, chain_reader: Option<Arc<dyn ChainReader>>) -> SharedAppState {
        Arc::new(Self { indexer, chain_reader, rate_limiter: create_rate_limiter() })
    }
}

pub fn build_router(state: SharedAppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let rate_limiter = state.rate_limiter.clone();

    Router::new()
        .route("/healthz", get(handle_healthz))
        .route("/status", get(handle_status))
        .route("/scan", post(handle_scan))
        .route("/proof/:commitment", get(handle_proof))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware))
        .layer(cors)
        .with_state(state)
}

async fn handle_healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Serialize)]
struct StatusResponse {
    synced: bool,
    local_root: String,
    on_chain_root: Option<String>,
    next_index: u64,
}

/// With a configured chain reader, this triggers a sync pass and reports
/// whether the rebuilt local tree agrees with on-chain state. Without one
/// (scan-only deployments) it just reports the local tree's own state.
async fn handle_status(State(state): State<SharedAppState>) -> impl IntoResponse {
    match &state.chain_reader {
        Some(reader) => match state.indexer.resync(reader.as_ref()).await {
            Ok(status) => Json(StatusResponse {
                synced: status.synced,
                local_root: hex::encode(status.local_root.to_be_bytes()),
                on_chain_root: Some(hex::encode(status.on_chain_root.to_be_bytes())),
                next_index: status.next_index,
            })
            .into_response(),
            Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        },
        None => {
            let root = state.indexer.current_root().await;
            Json(StatusResponse {
                synced: true,
                local_root: hex::encode(root.to_be_bytes()),
                on_chain_root: None,
                next_index: state.indexer.next_index().await,
            })
            .into_response()
        }
    }
}

#[derive(Deserialize)]
struct AnnouncementDto {
    ephemeral_pub_hex: String,
    amount: u64,
    commitment_hex: String,
    leaf_index: u64,
}

#[derive(Deserialize)]
struct ScanRequest {
    viewing_priv_hex: String,
    spending_pub_hex: String,
    announcements: Vec<AnnouncementDto>,
}

#[derive(Serialize)]
struct ScannedNoteDto {
    amount: u64,
    commitment_hex: String,
}

#[derive(Serialize)]
struct ScanResponse {
    matched: Vec<ScannedNoteDto>,
    examined: usize,
}

/// Run a scan pass against a supplied viewing key and a batch of
/// announcements; returns matched notes as amount + commitment only, never
/// a private scalar.
async fn handle_scan(
    State(state): State<SharedAppState>,
    Json(req): Json<ScanRequest>,
) -> impl IntoResponse {
    let viewing_priv = match decode_32(&req.viewing_priv_hex) {
        Ok(bytes) => Scalar::from_be_bytes_mod_order(&bytes),
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };
    let spending_pub = match decode_33(&req.spending_pub_hex)
        .and_then(|b| CurvePoint::decompress(&b).map_err(|e| e.to_string()))
    {
        Ok(p) => p,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    let mut announcements = Vec::with_capacity(req.announcements.len());
    for dto in &req.announcements {
        let amount_check = validate_amount_sats(dto.amount, 1, MAX_AMOUNT_SATS);
        if !amount_check.is_valid {
            return error_response(StatusCode::BAD_REQUEST, &amount_check.errors.join("; "));
        }
        let ephemeral_pub = match decode_33(&dto.ephemeral_pub_hex)
            .and_then(|b| CurvePoint::decompress(&b).map_err(|e| e.to_string()))
        {
            Ok(p) => p,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
        };
        let commitment = match decode_32(&dto.commitment_hex) {
            Ok(b) => FieldElement::from_be_bytes_mod_order(&b),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
        };
        announcements.push(Announcement {
            bump: 0,
            ephemeral_pub,
            amount: dto.amount,
            commitment,
            leaf_index: dto.leaf_index,
            created_at: 0,
        });
    }

    let result = state.indexer.scan(&viewing_priv, &spending_pub, &announcements).await;
    Json(ScanResponse {
        matched: result
            .notes
            .iter()
            .map(|n| ScannedNoteDto {
                amount: n.amount,
                commitment_hex: hex::encode(n.commitment.to_be_bytes()),
            })
            .collect(),
        examined: result.examined,
    })
    .into_response()
}

#[derive(Serialize)]
struct ProofResponse {
    siblings: Vec<String>,
    indices: Vec<u8>,
    root: String,
}

async fn handle_proof(
    State(state): State<SharedAppState>,
    Path(commitment_hex): Path<String>,
) -> impl IntoResponse {
    let bytes = match decode_32(&commitment_hex) {
        Ok(b) => b,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };
    let commitment = FieldElement::from_be_bytes_mod_order(&bytes);

    match state.indexer.prove(&commitment).await {
        Ok(proof) => Json(ProofResponse {
            siblings: proof.siblings.iter().map(|s| hex::encode(s.to_be_bytes())).collect(),
            indices: proof.indices,
            root: hex::encode(proof.root.to_be_bytes()),
        })
        .into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, &e.to_string()),
    }
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn decode_32(s: &str) -> Result<[u8; 32], String> {
    decode_hex_validated(s, 32, "field element").map(|bytes| {
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        out
    })
}

fn decode_33(s: &str) -> Result<[u8; 33], String> {
    decode_hex_validated(s, 33, "compressed point").map(|bytes| {
        let mut out = [0u8; 33];
        out.copy_from_slice(&bytes);
        out
    })
}

/// Run the request field through `validate_hex` before decoding it, so a
/// malformed length or non-canonical hex digit is rejected with the same
/// message the middleware's validator already produces for it.
fn decode_hex_validated(s: &str, expected_len: usize, field_name: &str) -> Result<Vec<u8>, String> {
    let result = validate_hex(s, Some(expected_len), field_name);
    if !result.is_valid {
        return Err(result.errors.join("; "));
    }
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn test_state() -> SharedAppState {
        AppState::new(Arc::new(IndexerService::new()), None)
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn proof_for_unknown_commitment_is_not_found() {
        let app = build_router(test_state());
        let uri = format!("/proof/{}", hex::encode(FieldElement::from_u64(1).to_be_bytes()));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_without_a_chain_reader_reports_local_state() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn scan_rejects_an_announcement_with_a_zero_amount() {
        let app = build_router(test_state());
        let body = serde_json::json!({
            "viewing_priv_hex": hex::encode([1u8; 32]),
            "spending_pub_hex": hex::encode(CurvePoint::generator().compress().unwrap()),
            "announcements": [{
                "ephemeral_pub_hex": hex::encode(CurvePoint::generator().compress().unwrap()),
                "amount": 0,
                "commitment_hex": hex::encode(FieldElement::from_u64(1).to_be_bytes()),
                "leaf_index": 0,
            }],
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/scan")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
