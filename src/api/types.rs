//! Request/response types and error mapping for the REST surface

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize, Serializer};

use crate::ledger::LedgerError;

/// Smallest tradable quantity accepted at the boundary
pub const MIN_QUANTITY: Decimal = dec!(0.00000001);

/// Body of `POST /api/buy` and `POST /api/sell`
#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub quantity: Decimal,
}

impl TradeRequest {
    /// Boundary validation; the engine re-checks only positivity
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.symbol.trim().is_empty() {
            return Err(ApiError::BadRequest("symbol is required".to_string()));
        }
        if self.quantity < MIN_QUANTITY {
            return Err(ApiError::BadRequest(format!(
                "quantity must be at least {}",
                MIN_QUANTITY
            )));
        }
        Ok(())
    }
}

/// Error payload returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Client-facing failure: rejected request or internal fault
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Storage(_) => ApiError::Internal(err.to_string()),
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

/// Decimal that serializes as an exact JSON number rather than a string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsonDecimal(pub Decimal);

impl Serialize for JsonDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::arbitrary_precision::serialize(&self.0, serializer)
    }
}
