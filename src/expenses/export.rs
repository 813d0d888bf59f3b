//! Spreadsheet export of an owner's expense history.
//!
//! Rows come from a fixed column table so the layout never depends on the
//! shape of [`ExpenseRecord`]. The workbook is built and serialized fully in
//! memory.

use anyhow::Context;
use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use rust_xlsxwriter::Workbook;
use time::{OffsetDateTime, UtcOffset};
use tracing::info;
use uuid::Uuid;

use super::dto::MAX_TEXT_CHARS;
use super::repo::ExpenseRepo;
use super::repo_types::ExpenseRecord;
use crate::error::ExpenseError;

pub const SHEET_NAME: &str = "Expense";
pub const EXPORT_FILENAME: &str = "expense_details.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

pub struct Column {
    pub header: &'static str,
    pub cell: fn(&ExpenseRecord) -> Cell,
}

pub const EXPORT_COLUMNS: [Column; 5] = [
    Column { header: "Category", cell: category_cell },
    Column { header: "Amount", cell: amount_cell },
    Column { header: "Date", cell: date_cell },
    Column { header: "Paid Via", cell: paid_via_cell },
    Column { header: "Icon", cell: icon_cell },
];

/// Rows stored before the create-time length check may be longer than a cell.
fn text(s: &str) -> Cell {
    Cell::Text(s.chars().take(MAX_TEXT_CHARS).collect())
}

fn category_cell(r: &ExpenseRecord) -> Cell {
    text(&r.category)
}

fn amount_cell(r: &ExpenseRecord) -> Cell {
    Cell::Number(r.amount)
}

fn date_cell(r: &ExpenseRecord) -> Cell {
    Cell::Text(format_date(r.date))
}

fn paid_via_cell(r: &ExpenseRecord) -> Cell {
    r.paid_via.as_deref().map_or(Cell::Blank, text)
}

fn icon_cell(r: &ExpenseRecord) -> Cell {
    match r.icon.as_deref() {
        Some(icon) if !icon.is_empty() => text(icon),
        _ => Cell::Text("N/A".into()),
    }
}

/// US calendar date (`M/D/YYYY`) of the UTC day.
pub fn format_date(ts: OffsetDateTime) -> String {
    let d = ts.to_offset(UtcOffset::UTC);
    format!("{}/{}/{}", u8::from(d.month()), d.day(), d.year())
}

pub fn project_row(record: &ExpenseRecord) -> Vec<Cell> {
    EXPORT_COLUMNS.iter().map(|c| (c.cell)(record)).collect()
}

/// Header row plus one row per record, in the order given.
pub fn build_workbook(records: &[ExpenseRecord]) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, column) in (0u16..).zip(EXPORT_COLUMNS.iter()) {
        sheet.write_string(0, col, column.header)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = u32::try_from(idx + 1).context("too many rows for a worksheet")?;
        for (col, cell) in (0u16..).zip(project_row(record)) {
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(row, col, &s)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(row, col, n)?;
                }
                Cell::Blank => {}
            }
        }
    }

    let bytes = workbook.save_to_buffer().context("serialize workbook")?;
    Ok(bytes)
}

#[derive(Debug)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub filename: &'static str,
    pub content_type: &'static str,
}

impl IntoResponse for ExportFile {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename={}", self.filename);
        let length = self.bytes.len().to_string();
        (
            [
                (header::CONTENT_DISPOSITION, disposition),
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_LENGTH, length),
            ],
            self.bytes,
        )
            .into_response()
    }
}

pub async fn serialize(repo: &dyn ExpenseRepo, owner_id: Uuid) -> Result<ExportFile, ExpenseError> {
    let records = repo
        .list_by_owner(owner_id)
        .await
        .map_err(ExpenseError::Export)?;
    let bytes = build_workbook(&records).map_err(ExpenseError::Export)?;
    info!(%owner_id, rows = records.len(), bytes = bytes.len(), "expenses exported");
    Ok(ExportFile {
        bytes,
        filename: EXPORT_FILENAME,
        content_type: XLSX_CONTENT_TYPE,
    })
}
