//! # HTTP API
//!
//! The axum router in front of the protocol library. Every handler is
//! independent: construction routes are pure functions of the request body
//! and the configured network, and the three chain routes make exactly one
//! upstream call each.
//!
//! ## Endpoints
//!
//! | Method | Path              | Description                                  |
//! |--------|-------------------|----------------------------------------------|
//! | POST   | `/create-tx`      | Build an unsigned `payment_v2`               |
//! | POST   | `/combine-tx`     | Attach a signature                           |
//! | POST   | `/parse-tx`       | JSON view of a transaction string            |
//! | POST   | `/hash`           | Content hash of a transaction string         |
//! | POST   | `/derive`         | Address of an edwards25519 public key        |
//! | GET    | `/chain-vars`     | Chain variables, relayed from the chain API  |
//! | GET    | `/current-height` | Current block height                         |
//! | POST   | `/submit-tx`      | Relay a signed transaction                   |
//! | GET    | `/health`         | Liveness probe                               |
//! | GET    | `/metrics`        | Prometheus metrics                           |
//!
//! Failures are `{ "error": "..." }` with status 400 for bad input and 502
//! when the chain API fails.

use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use constructor_protocol::config::PAYMENT_V2_TYPE;
use constructor_protocol::transaction::PaymentRequest;
use constructor_protocol::{
    build_payment_v2, combine, compute_hash, derive_address, project, ChainVars,
    ConstructorError, Network, ParsedTransaction,
};

use crate::chain::ChainClient;
use crate::metrics::{metrics_handler, SharedMetrics};

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared state for all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Build version reported by `/health`.
    pub version: String,
    /// Fixed for the process lifetime.
    pub network: Network,
    pub chain: Arc<dyn ChainClient>,
    pub metrics: SharedMetrics,
}

impl FromRef<AppState> for SharedMetrics {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.metrics)
    }
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full router with CORS and request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/create-tx", post(create_tx_handler))
        .route("/combine-tx", post(combine_tx_handler))
        .route("/parse-tx", post(parse_tx_handler))
        .route("/hash", post(hash_handler))
        .route("/derive", post(derive_handler))
        .route("/chain-vars", get(chain_vars_handler))
        .route("/current-height", get(current_height_handler))
        .route("/submit-tx", post(submit_tx_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// Body of `POST /create-tx`.
#[derive(Debug, Deserialize)]
pub struct CreateTxRequest {
    #[serde(default)]
    pub chain_vars: Value,
    pub options: CreateTxOptions,
    pub get_nonce_for: Option<NonceFor>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTxOptions {
    pub transaction_type: String,
    pub helium_metadata: Option<HeliumMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct HeliumMetadata {
    pub payer: String,
    pub payments: Vec<PaymentRequest>,
}

#[derive(Debug, Deserialize)]
pub struct NonceFor {
    pub nonce: u64,
}

/// Body of `POST /combine-tx`.
#[derive(Debug, Deserialize)]
pub struct CombineTxRequest {
    pub unsigned_transaction: String,
    pub signatures: Vec<SignatureInput>,
}

#[derive(Debug, Deserialize)]
pub struct SignatureInput {
    pub hex_bytes: String,
}

/// Body of `POST /parse-tx`.
#[derive(Debug, Deserialize)]
pub struct ParseTxRequest {
    pub raw_transaction: String,
    #[serde(default)]
    pub signed: bool,
}

/// Body of `POST /hash`.
#[derive(Debug, Deserialize)]
pub struct HashRequest {
    pub txn: String,
}

/// Body of `POST /derive`.
#[derive(Debug, Deserialize)]
pub struct DeriveRequest {
    pub curve_type: String,
    pub public_key: String,
}

/// Body of `POST /submit-tx`.
#[derive(Debug, Deserialize)]
pub struct SubmitTxRequest {
    pub signed_transaction: String,
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTxResponse {
    pub unsigned_txn: String,
    #[serde(rename = "type")]
    pub txn_type: String,
    /// Hex of the bytes to sign.
    pub payload: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CombineTxResponse {
    pub signed_transaction: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HashResponse {
    pub hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeriveResponse {
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentHeightResponse {
    pub current_height: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub network: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A request failure on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ConstructorError);

impl From<ConstructorError> for ApiError {
    fn from(e: ConstructorError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ConstructorError::MalformedRequest(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Records the outcome of a request, logs failures, and renders the response.
fn respond<T: Serialize>(state: &AppState, route: &'static str, result: Result<T, ApiError>) -> Response {
    match result {
        Ok(body) => {
            state.metrics.record_request(route, "ok");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            state.metrics.record_request(route, err.0.kind());
            if err.0.is_upstream() {
                tracing::error!(route, kind = err.0.kind(), error = %err.0, "upstream failure");
            } else {
                tracing::warn!(route, kind = err.0.kind(), error = %err.0, "request rejected");
            }
            err.into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Construction Handlers
// ---------------------------------------------------------------------------

/// `POST /create-tx`: builds an unsigned payment from client input.
///
/// The nonce used is `get_nonce_for.nonce + 1`; the fee is computed from
/// the supplied `chain_vars`.
async fn create_tx_handler(
    State(state): State<AppState>,
    body: Result<Json<CreateTxRequest>, JsonRejection>,
) -> Response {
    let result = body.map_err(ApiError::from).and_then(|Json(req)| create_tx(req));
    respond(&state, "/create-tx", result)
}

fn create_tx(req: CreateTxRequest) -> Result<CreateTxResponse, ApiError> {
    if req.options.transaction_type != PAYMENT_V2_TYPE {
        return Err(ConstructorError::UnrecognizedTransactionType(req.options.transaction_type).into());
    }

    let metadata = req.options.helium_metadata.ok_or_else(|| {
        ConstructorError::MalformedRequest("options.helium_metadata is required".into())
    })?;
    let nonce_seed = req.get_nonce_for.map(|n| n.nonce).ok_or_else(|| {
        ConstructorError::MalformedRequest("get_nonce_for.nonce is required".into())
    })?;
    let chain_vars = ChainVars::from_json(&req.chain_vars)?;

    let built = build_payment_v2(&metadata.payer, metadata.payments, nonce_seed, chain_vars)?;

    Ok(CreateTxResponse {
        unsigned_txn: built.unsigned_txn(),
        txn_type: PAYMENT_V2_TYPE.to_string(),
        payload: built.payload_hex(),
    })
}

/// `POST /combine-tx`: attaches the first signature to the transaction.
async fn combine_tx_handler(
    State(state): State<AppState>,
    body: Result<Json<CombineTxRequest>, JsonRejection>,
) -> Response {
    let result = body.map_err(ApiError::from).and_then(|Json(req)| {
        let signature = req.signatures.first().ok_or_else(|| {
            ConstructorError::MalformedRequest("signatures must not be empty".into())
        })?;
        let signed_transaction = combine(&req.unsigned_transaction, &signature.hex_bytes)?;
        Ok(CombineTxResponse { signed_transaction })
    });
    respond(&state, "/combine-tx", result)
}

/// `POST /parse-tx`: projects a transaction string to JSON.
async fn parse_tx_handler(
    State(state): State<AppState>,
    body: Result<Json<ParseTxRequest>, JsonRejection>,
) -> Response {
    let result: Result<ParsedTransaction, ApiError> = body
        .map_err(ApiError::from)
        .and_then(|Json(req)| Ok(project(&req.raw_transaction, req.signed)?));
    respond(&state, "/parse-tx", result)
}

/// `POST /hash`: content hash, identical before and after signing.
async fn hash_handler(
    State(state): State<AppState>,
    body: Result<Json<HashRequest>, JsonRejection>,
) -> Response {
    let result = body.map_err(ApiError::from).and_then(|Json(req)| {
        Ok(HashResponse {
            hash: compute_hash(&req.txn)?,
        })
    });
    respond(&state, "/hash", result)
}

/// `POST /derive`: address of a public key on this server's network.
async fn derive_handler(
    State(state): State<AppState>,
    body: Result<Json<DeriveRequest>, JsonRejection>,
) -> Response {
    let network = state.network;
    let result = body.map_err(ApiError::from).and_then(|Json(req)| {
        let address = derive_address(network, &req.curve_type, &req.public_key)?;
        Ok(DeriveResponse {
            address: address.to_b58(),
        })
    });
    respond(&state, "/derive", result)
}

// ---------------------------------------------------------------------------
// Chain Handlers
// ---------------------------------------------------------------------------

/// `GET /chain-vars`: relays the live chain variables.
async fn chain_vars_handler(State(state): State<AppState>) -> Response {
    let result: Result<Map<String, Value>, ApiError> = {
        let _timer = state.metrics.upstream_timer("chain_vars");
        state
            .chain
            .chain_vars()
            .await
            .map_err(|e| ApiError(e.into()))
    };
    respond(&state, "/chain-vars", result)
}

/// `GET /current-height`
async fn current_height_handler(State(state): State<AppState>) -> Response {
    let result = {
        let _timer = state.metrics.upstream_timer("current_height");
        state
            .chain
            .current_height()
            .await
            .map(|current_height| CurrentHeightResponse { current_height })
            .map_err(|e| ApiError(e.into()))
    };
    respond(&state, "/current-height", result)
}

/// `POST /submit-tx`: relays a signed transaction, returning its hash.
async fn submit_tx_handler(
    State(state): State<AppState>,
    body: Result<Json<SubmitTxRequest>, JsonRejection>,
) -> Response {
    let result = match body {
        Ok(Json(req)) => {
            let _timer = state.metrics.upstream_timer("submit");
            state
                .chain
                .submit(&req.signed_transaction)
                .await
                .map(|hash| HashResponse { hash })
                .map_err(|e| ApiError(e.into()))
        }
        Err(rejection) => Err(rejection.into()),
    };
    if let Ok(resp) = &result {
        tracing::info!(hash = %resp.hash, "transaction submitted");
    }
    respond(&state, "/submit-tx", result)
}

/// `GET /health`: liveness probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".into(),
        network: state.network.to_string(),
        version: state.version.clone(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
