use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CreateExpenseRequest, MessageResponse};
use super::export::{self, ExportFile};
use super::repo_types::ExpenseRecord;
use super::services;
use crate::{auth::AuthUser, error::ExpenseError, state::AppState};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/download", get(download_expenses))
        .route("/expenses/:id", delete(delete_expense))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseRecord>), ExpenseError> {
    let record = services::create_expense(state.expenses.as_ref(), owner_id, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
) -> Result<Json<Vec<ExpenseRecord>>, ExpenseError> {
    let rows = services::list_expenses(state.expenses.as_ref(), owner_id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ExpenseError> {
    services::delete_expense(state.expenses.as_ref(), owner_id, id).await?;
    Ok(Json(MessageResponse {
        message: "Expense deleted successfully",
    }))
}

#[instrument(skip(state))]
pub async fn download_expenses(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
) -> Result<ExportFile, ExpenseError> {
    export::serialize(state.expenses.as_ref(), owner_id).await
}
