use tracing::{debug, info};
use uuid::Uuid;

use super::dto::CreateExpenseRequest;
use super::repo::ExpenseRepo;
use super::repo_types::ExpenseRecord;
use crate::error::ExpenseError;

pub async fn create_expense(
    repo: &dyn ExpenseRepo,
    owner_id: Uuid,
    request: CreateExpenseRequest,
) -> Result<ExpenseRecord, ExpenseError> {
    let new = request.validate()?;
    let record = repo
        .insert(owner_id, new)
        .await
        .map_err(ExpenseError::Storage)?;
    info!(%owner_id, expense_id = %record.id, category = %record.category, "expense created");
    Ok(record)
}

pub async fn list_expenses(
    repo: &dyn ExpenseRepo,
    owner_id: Uuid,
) -> Result<Vec<ExpenseRecord>, ExpenseError> {
    let rows = repo
        .list_by_owner(owner_id)
        .await
        .map_err(ExpenseError::Storage)?;
    debug!(%owner_id, count = rows.len(), "expenses listed");
    Ok(rows)
}

/// Idempotent: succeeds whether or not the owner had a record with this id.
pub async fn delete_expense(
    repo: &dyn ExpenseRepo,
    owner_id: Uuid,
    id: Uuid,
) -> Result<(), ExpenseError> {
    let removed = repo
        .delete_by_id(owner_id, id)
        .await
        .map_err(ExpenseError::Storage)?;
    if removed {
        info!(%owner_id, expense_id = %id, "expense deleted");
    } else {
        debug!(%owner_id, expense_id = %id, "delete matched no owned expense");
    }
    Ok(())
}
