use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use skyfare_core::wallet::WalletTransaction;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct WalletResponse {
    balance: i64,
    transactions: Vec<WalletTransaction>,
}

#[derive(Debug, Deserialize)]
struct TopUpRequest {
    amount: i64,
}

#[derive(Debug, Serialize)]
struct TopUpResponse {
    message: String,
    balance: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/wallet", get(get_wallet))
        .route("/v1/wallet/topup", post(top_up))
}

async fn get_wallet(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<WalletResponse>, AppError> {
    let user_id = claims.user_id()?;
    let mut wallet = state
        .wallets
        .find_by_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Wallet not found".to_string()))?;

    wallet.transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(Json(WalletResponse { balance: wallet.balance, transactions: wallet.transactions }))
}

async fn top_up(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TopUpRequest>,
) -> Result<Json<TopUpResponse>, AppError> {
    let user_id = claims.user_id()?;
    if req.amount <= 0 {
        return Err(AppError::ValidationError("Invalid amount".to_string()));
    }

    let balance = state
        .wallets
        .credit(user_id, req.amount, "Funds added to wallet")
        .await?;

    Ok(Json(TopUpResponse { message: "Funds added successfully".to_string(), balance }))
}
