use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ExpenseRecord, NewExpense};

/// Persistence contract for expense records. Every call goes to the backing
/// store; nothing is cached.
#[async_trait]
pub trait ExpenseRepo: Send + Sync {
    async fn insert(&self, owner_id: Uuid, expense: NewExpense) -> anyhow::Result<ExpenseRecord>;

    /// Newest `date` first, ties broken by newest `created_at`.
    async fn list_by_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<ExpenseRecord>>;

    /// Returns whether a row was removed. Rows of other owners are never touched.
    async fn delete_by_id(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgExpenseRepo {
    db: PgPool,
}

impl PgExpenseRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExpenseRepo for PgExpenseRepo {
    async fn insert(&self, owner_id: Uuid, expense: NewExpense) -> anyhow::Result<ExpenseRecord> {
        let record = sqlx::query_as::<_, ExpenseRecord>(
            r#"
            INSERT INTO expenses (id, owner_id, icon, category, amount, date, paid_via)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, icon, category, amount, date, paid_via, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(expense.icon)
        .bind(expense.category)
        .bind(expense.amount)
        .bind(expense.date)
        .bind(expense.paid_via)
        .fetch_one(&self.db)
        .await
        .context("insert expense")?;
        Ok(record)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<ExpenseRecord>> {
        let rows = sqlx::query_as::<_, ExpenseRecord>(
            r#"
            SELECT id, owner_id, icon, category, amount, date, paid_via, created_at
              FROM expenses
             WHERE owner_id = $1
             ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await
        .context("list expenses by owner")?;
        Ok(rows)
    }

    async fn delete_by_id(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM expenses
             WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.db)
        .await
        .context("delete expense")?;
        Ok(result.rows_affected() > 0)
    }
}
