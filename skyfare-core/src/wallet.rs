use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Never negative. Always equals the signed sum of `transactions`.
    pub balance: i64,
    pub transactions: Vec<WalletTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        }
    }
}

impl Wallet {
    /// Signed sum of the transaction log. The balance invariant check.
    pub fn ledger_sum(&self) -> i64 {
        self.transactions
            .iter()
            .map(|t| match t.kind {
                TransactionKind::Credit => t.amount,
                TransactionKind::Debit => -t.amount,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_sum_matches_balance() {
        let now = Utc::now();
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            balance: 47_500,
            transactions: vec![
                WalletTransaction {
                    kind: TransactionKind::Credit,
                    amount: 50_000,
                    description: "Initial wallet balance".into(),
                    timestamp: now,
                },
                WalletTransaction {
                    kind: TransactionKind::Debit,
                    amount: 2_500,
                    description: "Flight booking - AI101".into(),
                    timestamp: now,
                },
            ],
        };
        assert_eq!(wallet.ledger_sum(), wallet.balance);
    }

    #[test]
    fn test_transaction_kind_serialization() {
        assert_eq!(serde_json::to_string(&TransactionKind::Credit).unwrap(), "\"credit\"");
        assert_eq!(serde_json::to_string(&TransactionKind::Debit).unwrap(), "\"debit\"");
    }
}
