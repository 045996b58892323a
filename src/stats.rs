//! Pure aggregations over an entry list. Nothing here reads the clock; the
//! reference day or month is always passed in.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};

use crate::WorkEntry;

pub const DAILY_WINDOW: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeAmount {
    pub day: NaiveDate,
    pub label: String,
    pub amount: f64,
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

pub fn count_on_date(entries: &[WorkEntry], day: NaiveDate) -> usize {
    entries.iter().filter(|e| e.day() == day).count()
}

pub fn count_in_month(entries: &[WorkEntry], month: NaiveDate) -> usize {
    entries.iter().filter(|e| same_month(e.day(), month)).count()
}

pub fn amount_in_month(entries: &[WorkEntry], month: NaiveDate) -> f64 {
    entries
        .iter()
        .filter(|e| same_month(e.day(), month))
        .map(|e| e.amount)
        .sum()
}

pub fn total_amount(entries: &[WorkEntry]) -> f64 {
    entries.iter().map(|e| e.amount).sum()
}

/// Mean amount rounded to the nearest whole number; zero for no entries.
pub fn average_amount(entries: &[WorkEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    (total_amount(entries) / entries.len() as f64).round()
}

/// Entry counts for the `window` days ending at `reference_day`, oldest first.
pub fn daily_counts(
    entries: &[WorkEntry],
    reference_day: NaiveDate,
    window: usize,
) -> Vec<DailyCount> {
    (0..window)
        .rev()
        .map(|back| {
            let day = reference_day - Duration::days(back as i64);
            DailyCount {
                day,
                label: day.format("%b %d").to_string(),
                count: count_on_date(entries, day),
            }
        })
        .collect()
}

pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

pub fn days_in_month(day: NaiveDate) -> u32 {
    let first = first_of_month(day);
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    match next {
        Some(next) => (next - first).num_days() as u32,
        None => 31,
    }
}

/// Running total of the month's amounts for every day of `reference_month`.
///
/// Entries are selected by month membership, then counted for each day whose
/// day-of-month is at least the entry's day-of-month.
pub fn month_to_date_cumulative(
    entries: &[WorkEntry],
    reference_month: NaiveDate,
) -> Vec<CumulativeAmount> {
    let month_entries: Vec<&WorkEntry> = entries
        .iter()
        .filter(|e| same_month(e.day(), reference_month))
        .collect();

    let first = first_of_month(reference_month);
    (0..days_in_month(first))
        .map(|offset| {
            let day = first + Duration::days(offset as i64);
            let amount = month_entries
                .iter()
                .filter(|e| e.day().day() <= day.day())
                .map(|e| e.amount)
                .sum();
            CumulativeAmount {
                day,
                label: day.format("%d").to_string(),
                amount,
            }
        })
        .collect()
}

/// Figures shown on the dashboard's stat cards.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub month_name: String,
    pub today_count: usize,
    pub month_count: usize,
    pub month_amount: f64,
    pub total_amount: f64,
    pub average_amount: f64,
}

impl Summary {
    pub fn compute(entries: &[WorkEntry], now: DateTime<Local>) -> Self {
        let today = now.date_naive();
        Summary {
            month_name: today.format("%B").to_string(),
            today_count: count_on_date(entries, today),
            month_count: count_in_month(entries, today),
            month_amount: amount_in_month(entries, today),
            total_amount: total_amount(entries),
            average_amount: average_amount(entries),
        }
    }
}
