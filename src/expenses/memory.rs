use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::ExpenseRepo;
use super::repo_types::{ExpenseRecord, NewExpense};

/// Vec-backed repository for tests. `failing()` builds one whose every call
/// errors, standing in for a database outage.
#[derive(Default)]
pub struct InMemoryExpenseRepo {
    rows: RwLock<Vec<ExpenseRecord>>,
    fail: bool,
}

impl InMemoryExpenseRepo {
    pub fn failing() -> Self {
        Self {
            rows: RwLock::default(),
            fail: true,
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl ExpenseRepo for InMemoryExpenseRepo {
    async fn insert(&self, owner_id: Uuid, expense: NewExpense) -> anyhow::Result<ExpenseRecord> {
        self.check()?;
        let record = ExpenseRecord {
            id: Uuid::new_v4(),
            owner_id,
            icon: expense.icon,
            category: expense.category,
            amount: expense.amount,
            date: expense.date,
            paid_via: expense.paid_via,
            created_at: OffsetDateTime::now_utc(),
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<ExpenseRecord>> {
        self.check()?;
        let mut rows: Vec<ExpenseRecord> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(rows)
    }

    async fn delete_by_id(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        self.check()?;
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.owner_id == owner_id));
        Ok(rows.len() < before)
    }
}
