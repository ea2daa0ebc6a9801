use serde::Serialize;
use utoipa::ToSchema;

/// Generic envelope for read-projection responses (spec.md §6).
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    #[schema(value_type = Object)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "SUCCESS",
            data,
        }
    }
}

/// Flat body of a successful transfer — not wrapped in `ApiResponse`,
/// the shape is fixed by spec.md §6: `{status, txId, balance, _cached?}`.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub status: &'static str,
    pub tx_id: uuid::Uuid,
    pub balance: String,
    #[serde(rename = "_cached", skip_serializing_if = "Option::is_none")]
    pub _cached: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceData {
    pub balance: String,
}

/// Page envelope for the ledger/history projections. Not `ToSchema`
/// itself — it only ever appears behind `ApiResponse<T>`'s `Object`
/// field override, so Swagger just sees it as an opaque payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}
