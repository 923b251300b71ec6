use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use skyfare_core::store::UserStore;
use skyfare_core::user::User;
use skyfare_core::wallet::TransactionKind;
use skyfare_core::StoreError;

use crate::store_error;

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create(&self, email: &str, name: &str, starting_credit: i64) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let wallet_id = Uuid::new_v4();

        sqlx::query("INSERT INTO users (id, email, name, created_at) VALUES ($1, $2, $3, $4)")
            .bind(user_id)
            .bind(email)
            .bind(name)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        sqlx::query("INSERT INTO wallets (id, user_id, balance) VALUES ($1, $2, $3)")
            .bind(wallet_id)
            .bind(user_id)
            .bind(starting_credit)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        sqlx::query(
            "INSERT INTO wallet_transactions (wallet_id, kind, amount, description, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(wallet_id)
        .bind(TransactionKind::Credit.as_str())
        .bind(starting_credit)
        .bind("Initial wallet balance")
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;

        Ok(User {
            id: user_id,
            email: email.to_string(),
            name: name.to_string(),
            created_at: now,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.map(User::from))
    }
}
