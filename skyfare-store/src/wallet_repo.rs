use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use skyfare_core::store::WalletStore;
use skyfare_core::wallet::{TransactionKind, Wallet, WalletTransaction};
use skyfare_core::StoreError;

use crate::store_error;

pub struct PostgresWalletStore {
    pool: PgPool,
}

impl PostgresWalletStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    kind: String,
    amount: i64,
    description: String,
    created_at: chrono::DateTime<Utc>,
}

impl From<TransactionRow> for WalletTransaction {
    fn from(row: TransactionRow) -> Self {
        WalletTransaction {
            kind: if row.kind == "debit" { TransactionKind::Debit } else { TransactionKind::Credit },
            amount: row.amount,
            description: row.description,
            timestamp: row.created_at,
        }
    }
}

#[async_trait]
impl WalletStore for PostgresWalletStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Wallet>, StoreError> {
        let wallet_row = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT id, balance FROM wallets WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        let Some((id, balance)) = wallet_row else {
            return Ok(None);
        };

        let transactions = sqlx::query_as::<_, TransactionRow>(
            "SELECT kind, amount, description, created_at FROM wallet_transactions WHERE wallet_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(Some(Wallet {
            id,
            user_id,
            balance,
            transactions: transactions.into_iter().map(WalletTransaction::from).collect(),
        }))
    }

    async fn credit(&self, user_id: Uuid, amount: i64, description: &str) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let updated = sqlx::query_as::<_, (Uuid, i64)>(
            "UPDATE wallets SET balance = balance + $2 WHERE user_id = $1 RETURNING id, balance",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

        let Some((wallet_id, balance)) = updated else {
            return Err(StoreError::NotFound("wallet"));
        };

        sqlx::query(
            "INSERT INTO wallet_transactions (wallet_id, kind, amount, description, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(wallet_id)
        .bind(TransactionKind::Credit.as_str())
        .bind(amount)
        .bind(description)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        Ok(balance)
    }
}
