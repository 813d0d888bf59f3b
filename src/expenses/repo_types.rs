use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One user's single spending entry as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub icon: Option<String>,
    pub category: String,
    pub amount: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub paid_via: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Expense fields that already passed validation. Built only by
/// `CreateExpenseRequest::validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub icon: Option<String>,
    pub category: String,
    pub amount: f64,
    pub date: OffsetDateTime, // UTC
    pub paid_via: Option<String>,
}
