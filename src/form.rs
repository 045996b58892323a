use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use uuid::Uuid;

use crate::error::{DashError, Result};
use crate::WorkEntry;

pub const FORM_ERROR: &str = "Please fill in all fields correctly";

/// Raw input from the new-entry form, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryForm {
    pub designer_name: String,
    pub work_type: String,
    pub date: Option<NaiveDate>,
    pub company: String,
    pub amount: String,
}

impl EntryForm {
    /// Validates the form and turns it into a new entry created at `now`.
    pub fn submit(&self, now: DateTime<Local>) -> Result<WorkEntry> {
        let designer_name = required(&self.designer_name)?;
        let work_type = required(&self.work_type)?;
        let company = required(&self.company)?;
        let amount = parse_amount(&self.amount)?;
        let day = self.date.ok_or_else(|| DashError::invalid_input(FORM_ERROR))?;
        let date = local_midnight(day)?;

        Ok(WorkEntry {
            id: Uuid::new_v4().to_string(),
            designer_name,
            work_type,
            date,
            company,
            amount,
            created_at: now,
        })
    }
}

fn required(field: &str) -> Result<String> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Err(DashError::invalid_input(FORM_ERROR));
    }
    Ok(trimmed.to_string())
}

fn parse_amount(raw: &str) -> Result<f64> {
    let amount: f64 = required(raw)?
        .parse()
        .map_err(|_| DashError::invalid_input(FORM_ERROR))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(DashError::invalid_input(FORM_ERROR));
    }
    Ok(amount)
}

fn local_midnight(day: NaiveDate) -> Result<DateTime<Local>> {
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DashError::invalid_input(FORM_ERROR))?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(|| DashError::invalid_input(format!("{} does not exist in local time", day)))
}

/// Accepts `today`, `yesterday`, `tomorrow` or `YYYY-MM-DD`.
pub fn parse_date(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    match raw.trim() {
        "today" => Ok(today),
        "yesterday" => Ok(today - Duration::days(1)),
        "tomorrow" => Ok(today + Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|_| DashError::invalid_input(format!("Invalid date: {}", other))),
    }
}
