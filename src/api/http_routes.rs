use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::dto::{LedgerEntryDto, TransactionDto};
use crate::api::error::ApiError;
use crate::api::response::{ApiResponse, BalanceData, PageData, TransferResponse};
use crate::domain::entities::TransactionType;
use crate::domain::types::{TransactionId, UserId};
use crate::use_cases::execute_transfer::ExecuteTransferUseCase;
use crate::use_cases::get_balance::GetBalanceUseCase;
use crate::use_cases::get_ledger::GetLedgerUseCase;
use crate::use_cases::get_transaction_by_id::GetTransactionByIdUseCase;
use crate::use_cases::get_transaction_history::GetTransactionHistoryUseCase;

const DEFAULT_LIMIT: i64 = 50;

/// Explicitly-constructed service context (spec.md §9): every use case
/// this adapter calls is handed in at boot, nothing is reached for via
/// a lazy global.
pub struct AppState {
    pub execute_transfer: ExecuteTransferUseCase,
    pub get_balance: GetBalanceUseCase,
    pub get_ledger: GetLedgerUseCase,
    pub get_transaction_history: GetTransactionHistoryUseCase,
    pub get_transaction_by_id: GetTransactionByIdUseCase,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/wallets/transactions", post(execute_transfer))
        .route("/api/v1/wallets/transactions/{transaction_id}", get(get_transaction_by_id))
        .route("/api/v1/wallets/{user_id}/balance", get(get_balance))
        .route("/api/v1/wallets/{user_id}/ledger", get(get_ledger))
        .route("/api/v1/wallets/{user_id}/transactions", get(get_transaction_history))
        .with_state(state)
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<Uuid>()
        .map(UserId)
        .map_err(|_| ApiError::BadRequest(format!("invalid user id: {raw}")))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTransferBody {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub asset_symbol: String,
}

/// Runs the Request Router, Idempotency Coordinator, and Transfer
/// Engine for one logical transfer attempt.
#[utoipa::path(
    post,
    path = "/api/v1/wallets/transactions",
    request_body = ExecuteTransferBody,
    responses((status = 200, description = "Transfer committed or replayed", body = TransferResponse)),
)]
pub async fn execute_transfer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ExecuteTransferBody>,
) -> Result<(StatusCode, Json<TransferResponse>), ApiError> {
    let idempotency_key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing Idempotency-Key header".to_string()))?
        .to_string();

    let (outcome, cached) = state
        .execute_transfer
        .execute(
            idempotency_key,
            UserId(body.user_id),
            body.transaction_type,
            body.amount,
            body.asset_symbol,
        )
        .await
        .map_err(ApiError::from)?;

    let response = TransferResponse {
        status: "SUCCESS",
        tx_id: outcome.tx_id.0,
        balance: outcome.user_balance.to_string(),
        _cached: cached.then_some(true),
    };

    Ok((StatusCode::OK, Json(response)))
}

#[derive(Deserialize)]
pub struct BalanceQuery {
    pub asset: String,
}

/// `GetBalance` read projection.
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{user_id}/balance",
    params(("user_id" = Uuid, Path), ("asset" = String, Query)),
    responses((status = 200, description = "Wallet balance", body = ApiResponse<BalanceData>)),
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<ApiResponse<BalanceData>>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let balance = state.get_balance.execute(user_id, &query.asset).await?;

    Ok(Json(ApiResponse::success(BalanceData {
        balance: balance.to_string(),
    })))
}

#[derive(Deserialize)]
pub struct LedgerQuery {
    pub asset: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GetLedger` read projection.
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{user_id}/ledger",
    params(("user_id" = Uuid, Path), ("asset" = Option<String>, Query), ("limit" = Option<i64>, Query), ("offset" = Option<i64>, Query)),
    responses((status = 200, description = "A page of ledger entries", body = ApiResponse<serde_json::Value>)),
)]
pub async fn get_ledger(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<ApiResponse<PageData<LedgerEntryDto>>>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let page = state
        .get_ledger
        .execute(user_id, query.asset.as_deref(), limit, offset)
        .await?;

    Ok(Json(ApiResponse::success(PageData {
        has_more: page.has_more(),
        items: page.items.into_iter().map(Into::into).collect(),
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistoryQuery {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub asset: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GetTransactionHistory` read projection.
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{user_id}/transactions",
    params(
        ("user_id" = Uuid, Path),
        ("type" = Option<TransactionType>, Query),
        ("asset" = Option<String>, Query),
        ("startDate" = Option<String>, Query),
        ("endDate" = Option<String>, Query),
        ("limit" = Option<i64>, Query),
        ("offset" = Option<i64>, Query),
    ),
    responses((status = 200, description = "A page of transactions", body = ApiResponse<serde_json::Value>)),
)]
pub async fn get_transaction_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<TransactionHistoryQuery>,
) -> Result<Json<ApiResponse<PageData<TransactionDto>>>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let page = state
        .get_transaction_history
        .execute(
            user_id,
            query.transaction_type,
            query.asset,
            query.start_date,
            query.end_date,
            limit,
            offset,
        )
        .await?;

    Ok(Json(ApiResponse::success(PageData {
        has_more: page.has_more(),
        items: page.items.into_iter().map(Into::into).collect(),
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    })))
}

/// `GetTransactionById` read projection.
#[utoipa::path(
    get,
    path = "/api/v1/wallets/transactions/{transaction_id}",
    params(("transaction_id" = Uuid, Path)),
    responses((status = 200, description = "A transaction and its two ledger entries", body = ApiResponse<serde_json::Value>)),
)]
pub async fn get_transaction_by_id(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let transaction_id = transaction_id
        .parse::<Uuid>()
        .map(TransactionId)
        .map_err(|_| ApiError::BadRequest(format!("invalid transaction id: {transaction_id}")))?;

    let (transaction, entries) = state.get_transaction_by_id.execute(transaction_id).await?;

    let body = serde_json::json!({
        "transaction": TransactionDto::from(transaction),
        "ledger": entries.into_iter().map(LedgerEntryDto::from).collect::<Vec<_>>(),
    });

    Ok(Json(ApiResponse::success(body)))
}
