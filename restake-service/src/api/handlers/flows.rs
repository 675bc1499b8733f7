//! One handler per flow. Bodies are decoded and validated here; anything
//! malformed is answered with 400 before a single chain call is made.

use super::types::{
    AmountRequest, ApiError, FlowReply, InstantUnstakeRequest, LiquidDepositRequest, RebalanceRequest, RedeemRequest,
    RequestUnlockRequest,
};
use crate::api::state::AppState;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::warn;
use restake_core::application::InstantUnstakeParams;
use restake_core::foundation::{OperationId, RestakeError};
use restake_core::infrastructure::logbus::OperationLog;
use serde::Serialize;
use std::sync::Arc;

type JsonBody<T> = Result<Json<T>, JsonRejection>;

fn respond<T: Serialize>(state: &AppState, flow: &str, result: Result<T, RestakeError>) -> Response {
    state.metrics.record_flow(flow, result.is_ok());
    match result {
        Ok(body) => FlowReply::ok(body).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

fn reject(state: &AppState, flow: &str, err: ApiError) -> Response {
    warn!("flow request rejected flow={} error={}", flow, err.message);
    state.metrics.record_flow(flow, false);
    err.into_response()
}

/// The body decoded but its fields did not validate. A subscriber may already be
/// waiting on `op_id`, so the channel is closed with the error line.
fn abort(state: &AppState, flow: &str, op_id: Option<OperationId>, err: RestakeError) -> RestakeError {
    let log = OperationLog::begin(state.orchestrator.log_bus().clone(), op_id);
    log.emit(format!("{flow} failed: {err}"));
    log.complete();
    err
}

pub async fn handle_stake(State(state): State<Arc<AppState>>, body: JsonBody<AmountRequest>) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return reject(&state, "stake", rejection.into()),
    };
    let result = match request.amount.token_units("amount") {
        Ok(amount) => state.orchestrator.stake(request.op_id, amount).await,
        Err(err) => Err(abort(&state, "stake", request.op_id, err)),
    };
    respond(&state, "stake", result)
}

pub async fn handle_withdraw(State(state): State<Arc<AppState>>, body: JsonBody<AmountRequest>) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return reject(&state, "unstake", rejection.into()),
    };
    let result = match request.amount.token_units("amount") {
        Ok(amount) => state.orchestrator.unstake(request.op_id, amount).await,
        Err(err) => Err(abort(&state, "unstake", request.op_id, err)),
    };
    respond(&state, "unstake", result)
}

pub async fn handle_deposit_liquid(State(state): State<Arc<AppState>>, body: JsonBody<LiquidDepositRequest>) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return reject(&state, "deposit", rejection.into()),
    };
    let result = match request.amount.token_units("amount") {
        Ok(assets) => state.orchestrator.deposit_liquid(request.op_id, assets, request.receiver).await,
        Err(err) => Err(abort(&state, "deposit", request.op_id, err)),
    };
    respond(&state, "deposit", result)
}

fn instant_unstake_params(request: &InstantUnstakeRequest) -> Result<InstantUnstakeParams, RestakeError> {
    let amount_in = request.amount_in.base_units("amountIn")?;
    let amount_out_min = match &request.min_out {
        Some(min_out) => min_out.base_units("minOut")?,
        None => Default::default(),
    };
    Ok(InstantUnstakeParams {
        amount_in,
        amount_out_min,
        fee: request.fee,
        recipient: request.recipient,
        unwrap: request.unwrap.unwrap_or(true),
        deadline_secs: request.deadline_sec,
    })
}

pub async fn handle_instant_unstake(State(state): State<Arc<AppState>>, body: JsonBody<InstantUnstakeRequest>) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return reject(&state, "instant-unstake", rejection.into()),
    };
    let result = match instant_unstake_params(&request) {
        Ok(params) => state.orchestrator.instant_unstake(request.op_id, params).await,
        Err(err) => Err(abort(&state, "instant-unstake", request.op_id, err)),
    };
    respond(&state, "instant-unstake", result)
}

pub async fn handle_request_unlock(State(state): State<Arc<AppState>>, body: JsonBody<RequestUnlockRequest>) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return reject(&state, "request-unlock", rejection.into()),
    };
    let result = match request.shares.base_units("shares") {
        Ok(shares) => state.orchestrator.request_unlock(request.op_id, shares).await,
        Err(err) => Err(abort(&state, "request-unlock", request.op_id, err)),
    };
    respond(&state, "request-unlock", result)
}

pub async fn handle_redeem(State(state): State<Arc<AppState>>, body: JsonBody<RedeemRequest>) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return reject(&state, "redeem", rejection.into()),
    };
    let result = match request.unlock_index.base_units("unlockIndex") {
        Ok(index) => state.orchestrator.redeem(request.op_id, index, request.receiver).await,
        Err(err) => Err(abort(&state, "redeem", request.op_id, err)),
    };
    respond(&state, "redeem", result)
}

/// The body is optional here: an empty POST rebalances without a log channel.
pub async fn handle_rebalance(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RebalanceRequest::default()
    } else {
        match serde_json::from_slice::<RebalanceRequest>(&body) {
            Ok(request) => request,
            Err(err) => return reject(&state, "rebalance", ApiError::bad_request(format!("malformed input: {err}"))),
        }
    };
    let result = state.orchestrator.rebalance(request.op_id).await;
    respond(&state, "rebalance", result)
}

pub async fn handle_balances(State(state): State<Arc<AppState>>) -> Response {
    let result = state.orchestrator.balances().await;
    respond(&state, "balances", result)
}
