use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

use super::repo_types::NewExpense;
use crate::error::ExpenseError;

/// Longest text a spreadsheet cell holds.
pub const MAX_TEXT_CHARS: usize = 32_767;

/// Amount as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

/// Date as sent by clients: epoch milliseconds or a textual date/timestamp.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Millis(i64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub icon: Option<String>,
    pub category: Option<String>,
    pub amount: Option<AmountInput>,
    pub date: Option<DateInput>,
    pub paid_via: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl AmountInput {
    fn is_blank(&self) -> bool {
        match self {
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    fn parse(&self) -> Result<f64, ExpenseError> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ExpenseError::Validation("amount must be a number".into()))?,
        };
        if !value.is_finite() {
            return Err(ExpenseError::Validation("amount must be a finite number".into()));
        }
        Ok(value)
    }
}

impl DateInput {
    fn is_blank(&self) -> bool {
        match self {
            Self::Millis(ms) => *ms == 0,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    fn parse(&self) -> Result<OffsetDateTime, ExpenseError> {
        let invalid = || ExpenseError::Validation("date is not a valid date".into());
        let parsed = match self {
            Self::Millis(ms) => {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(*ms) * 1_000_000)
                    .map_err(|_| invalid())?
            }
            Self::Text(s) => parse_date_text(s.trim()).ok_or_else(invalid)?,
        };
        Ok(parsed.to_offset(UtcOffset::UTC))
    }
}

fn parse_date_text(s: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(ts);
    }
    if let Ok(day) = Date::parse(s, format_description!("[year]-[month]-[day]")) {
        return Some(day.midnight().assume_utc());
    }
    PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .ok()
    .map(PrimitiveDateTime::assume_utc)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_length(name: &str, value: Option<&str>) -> Result<(), ExpenseError> {
    match value {
        Some(v) if v.chars().count() > MAX_TEXT_CHARS => Err(ExpenseError::Validation(format!(
            "{name} must be at most {MAX_TEXT_CHARS} characters"
        ))),
        _ => Ok(()),
    }
}

impl CreateExpenseRequest {
    /// Checks that category, amount and date are all present and truthy,
    /// then normalizes them. Presence is checked before format.
    pub fn validate(self) -> Result<NewExpense, ExpenseError> {
        let category = non_empty(self.category);
        let (Some(category), Some(amount), Some(date)) = (
            category,
            self.amount.filter(|a| !a.is_blank()),
            self.date.filter(|d| !d.is_blank()),
        ) else {
            return Err(ExpenseError::missing_fields());
        };

        let icon = non_empty(self.icon);
        let paid_via = non_empty(self.paid_via);
        check_length("category", Some(&category))?;
        check_length("icon", icon.as_deref())?;
        check_length("paidVia", paid_via.as_deref())?;

        Ok(NewExpense {
            icon,
            category,
            amount: amount.parse()?,
            date: date.parse()?,
            paid_via,
        })
    }
}
