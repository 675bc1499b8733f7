//! Request and reply shapes of the HTTP surface.

use alloy::primitives::{Address, U256};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use restake_core::foundation::util::amount::{parse_base_units, parse_decimal_amount};
use restake_core::foundation::{ErrorCode, OperationId, RestakeError, TOKEN_DECIMALS};
use serde::{Deserialize, Serialize};

/// Amount as sent by callers: a JSON string or a non-negative JSON integer.
/// Floats and negative numbers match neither variant and are rejected.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Integer(u64),
    Text(String),
}

impl AmountInput {
    /// Integer in base units (wei).
    pub fn base_units(&self, field: &str) -> Result<U256, RestakeError> {
        match self {
            AmountInput::Integer(value) => Ok(U256::from(*value)),
            AmountInput::Text(text) => parse_base_units(field, text),
        }
    }

    /// Human decimal in whole tokens, scaled by 18 decimals.
    pub fn token_units(&self, field: &str) -> Result<U256, RestakeError> {
        match self {
            AmountInput::Integer(value) => parse_decimal_amount(field, &value.to_string(), TOKEN_DECIMALS),
            AmountInput::Text(text) => parse_decimal_amount(field, text, TOKEN_DECIMALS),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRequest {
    pub amount: AmountInput,
    #[serde(default)]
    pub op_id: Option<OperationId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidDepositRequest {
    pub amount: AmountInput,
    #[serde(default)]
    pub receiver: Option<Address>,
    #[serde(default)]
    pub op_id: Option<OperationId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantUnstakeRequest {
    pub amount_in: AmountInput,
    #[serde(default)]
    pub min_out: Option<AmountInput>,
    #[serde(default)]
    pub fee: Option<u32>,
    #[serde(default)]
    pub recipient: Option<Address>,
    #[serde(default)]
    pub unwrap: Option<bool>,
    #[serde(default)]
    pub deadline_sec: Option<u64>,
    #[serde(default)]
    pub op_id: Option<OperationId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUnlockRequest {
    pub shares: AmountInput,
    #[serde(default)]
    pub op_id: Option<OperationId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub unlock_index: AmountInput,
    #[serde(default)]
    pub receiver: Option<Address>,
    #[serde(default)]
    pub op_id: Option<OperationId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceRequest {
    #[serde(default)]
    pub op_id: Option<OperationId>,
}

/// `{ "ok": true, ...outcome }`.
#[derive(Debug, Serialize)]
pub struct FlowReply<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> FlowReply<T> {
    pub fn ok(body: T) -> Self {
        Self { ok: true, body }
    }
}

impl<T: Serialize> IntoResponse for FlowReply<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    error: &'a str,
}

/// `{ "ok": false, "error": "<message>" }` with a non-2xx status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn too_many_requests() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded")
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::MalformedInput => StatusCode::BAD_REQUEST,
        ErrorCode::FinalityTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::ReadFailure | ErrorCode::WriteFailure | ErrorCode::Reverted => StatusCode::BAD_GATEWAY,
        ErrorCode::ConfigError | ErrorCode::SerializationError | ErrorCode::Message => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<RestakeError> for ApiError {
    fn from(err: RestakeError) -> Self {
        Self::new(status_for(err.code()), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("malformed input: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { ok: false, error: &self.message })).into_response()
    }
}
