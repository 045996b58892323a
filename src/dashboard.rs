//! Text rendering of the dashboard and the user actions that mutate it.

use std::cell::RefCell;

use chrono::{DateTime, Local};
use prettytable::{Cell, Row, Table};
use tracing::{error, info, warn};

use crate::companies::{Company, CompanyRegistry};
use crate::error::{DashError, Result};
use crate::form::EntryForm;
use crate::sort::SortState;
use crate::stats::{self, Summary, DAILY_WINDOW};
use crate::storage::Slots;
use crate::store::EntryStore;
use crate::WorkEntry;

pub const TITLE: &str = "Design Work Dashboard";
pub const SUBTITLE: &str = "Track your design projects and payments";
const EMPTY_TABLE: &str = "No work entries yet. Add your first entry above.";
const CHART_WIDTH: usize = 40;

/// Short-lived user notices.
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        info!(notice = message, "success");
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        warn!(notice = message, "error");
        eprintln!("Error: {}", message);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Keeps every notice instead of showing it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notices.borrow_mut().push(Notice::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices.borrow_mut().push(Notice::Error(message.to_string()));
    }
}

pub struct Dashboard<S: Slots, N: Notifier> {
    store: EntryStore<S>,
    companies: CompanyRegistry<S>,
    notifier: N,
}

impl<S: Slots + Clone, N: Notifier> Dashboard<S, N> {
    pub fn open(slots: S, notifier: N) -> Self {
        Dashboard {
            store: EntryStore::open(slots.clone()),
            companies: CompanyRegistry::open(slots),
            notifier,
        }
    }
}

impl<S: Slots, N: Notifier> Dashboard<S, N> {
    pub fn entries(&self) -> &[WorkEntry] {
        self.store.entries()
    }

    pub fn companies(&self) -> &CompanyRegistry<S> {
        &self.companies
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Validates and stores a new entry. Invalid input is reported through
    /// the notifier and yields `Ok(None)` without touching the store.
    pub fn submit(&mut self, form: &EntryForm, now: DateTime<Local>) -> Result<Option<WorkEntry>> {
        let entry = match form.submit(now) {
            Ok(entry) => entry,
            Err(DashError::InvalidInput(message)) => {
                self.notifier.error(&message);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = self.store.add(entry.clone()) {
            error!(error = ?e, "failed to save work entry");
            self.notifier.error("Failed to save work entry");
            return Err(e);
        }
        self.notifier.success("Work entry added successfully");
        Ok(Some(entry))
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        if let Err(e) = self.store.remove(id) {
            error!(error = ?e, id, "failed to delete work entry");
            self.notifier.error("Failed to delete work entry");
            return Err(e);
        }
        self.notifier.success("Work entry deleted");
        Ok(())
    }

    pub fn add_company(&mut self, name: &str) -> Result<Option<Company>> {
        match self.companies.add(name) {
            Ok(company) => {
                self.notifier
                    .success(&format!("Added {} to companies", company.label));
                Ok(Some(company))
            }
            Err(DashError::InvalidInput(message)) => {
                self.notifier.error(&message);
                Ok(None)
            }
            Err(e) => {
                error!(error = ?e, "failed to save company");
                self.notifier.error("Failed to save company");
                Err(e)
            }
        }
    }

    pub fn render_header(&self, now: DateTime<Local>) -> String {
        render_header(now)
    }

    pub fn render_stats(&self, now: DateTime<Local>) -> String {
        let summary = Summary::compute(self.store.entries(), now);

        let mut table = Table::new();
        table.add_row(row![Fb =>
            "Today's Entries",
            "This Month",
            "Monthly Revenue",
            "Average Amount"
        ]);
        table.add_row(row![
            summary.today_count,
            summary.month_count,
            format_amount(summary.month_amount),
            format_amount(summary.average_amount)
        ]);
        table.add_row(row![
            "Work items assigned today",
            format!("Work items in {}", summary.month_name),
            format!("Total amount for {}", summary.month_name),
            "Average payment per work item"
        ]);
        table.to_string()
    }

    pub fn render_table(&self, sort: SortState) -> String {
        let entries = self.store.entries();

        let mut table = Table::new();
        let columns = ["Designer Name", "Work Type", "Date", "Company", "Amount", "Id"];
        let mut header: Vec<Cell> = columns
            .iter()
            .map(|h| Cell::new(h).style_spec("Fb"))
            .collect();
        let marker = match sort.direction {
            crate::sort::SortDirection::Asc => " ^",
            crate::sort::SortDirection::Desc => " v",
        };
        let sorted_header = sort.field.to_string();
        for cell in header.iter_mut() {
            if cell.get_content() == sorted_header {
                *cell = Cell::new(&format!("{}{}", sorted_header, marker)).style_spec("Fb");
            }
        }
        table.add_row(Row::new(header));

        if entries.is_empty() {
            table.add_row(Row::new(vec![Cell::new(EMPTY_TABLE).with_hspan(6)]));
        } else {
            for entry in sort.apply(entries) {
                table.add_row(row![
                    entry.designer_name,
                    entry.work_type,
                    entry.date.format("%B %-d, %Y"),
                    self.companies.label_for(&entry.company),
                    r->format_amount(entry.amount),
                    entry.id
                ]);
            }
        }

        format!(
            "{}Total Payments: {}\n",
            table,
            format_amount(stats::total_amount(entries))
        )
    }

    pub fn render_daily_chart(&self, now: DateTime<Local>) -> String {
        let counts = stats::daily_counts(self.store.entries(), now.date_naive(), DAILY_WINDOW);
        let max = counts.iter().map(|c| c.count).max().unwrap_or(0) as f64;

        let mut table = Table::new();
        table.set_titles(row![Fb => "Work Assigned (Last 7 Days)", "", "Work Items"]);
        for c in counts {
            table.add_row(row![c.label, bar(c.count as f64, max), r->c.count]);
        }
        table.to_string()
    }

    pub fn render_cumulative_chart(&self, now: DateTime<Local>) -> String {
        let series = stats::month_to_date_cumulative(self.store.entries(), now.date_naive());
        let max = series.last().map(|c| c.amount).unwrap_or(0.0);

        let mut table = Table::new();
        table.set_titles(row![Fb => "Monthly Payment Accumulation", "", "Cumulative Amount"]);
        for c in series {
            table.add_row(row![c.label, bar(c.amount, max), r->format_amount(c.amount)]);
        }
        table.to_string()
    }

    pub fn render_companies(&self, companies: &[&Company]) -> String {
        let mut table = Table::new();
        table.add_row(row![Fb => "Company", "Value"]);
        for company in companies {
            table.add_row(row![company.label, company.value]);
        }
        table.to_string()
    }

    /// Header, stat cards, table and both charts.
    pub fn render(&self, now: DateTime<Local>, sort: SortState) -> String {
        [
            self.render_header(now),
            self.render_stats(now),
            self.render_table(sort),
            self.render_daily_chart(now),
            self.render_cumulative_chart(now),
        ]
        .join("\n")
    }
}

pub fn render_header(now: DateTime<Local>) -> String {
    format!(
        "{}\n{}\n{}  {}  {}\n",
        TITLE,
        SUBTITLE,
        now.format("%A"),
        now.format("%-d %B %Y"),
        now.format("%-I:%M:%S %p")
    )
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * CHART_WIDTH as f64).round().max(1.0) as usize;
    "#".repeat(len)
}

/// Rupee amount with thousands separators, e.g. `₹12,500`, `₹99.5` or
/// `₹-500` for a negative amount read back from storage.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("₹{}", amount);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (digits, cents) = fixed.split_at(fixed.len() - 3);
    let cents = cents[1..].trim_end_matches('0');

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let body = if cents.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, cents)
    };
    // Amounts that round to zero drop the sign.
    if body == "0" {
        return "₹0".to_string();
    }
    format!("₹{}{}", sign, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{SortDirection, SortField};
    use crate::storage::tests::FailingSlots;
    use crate::storage::MemorySlots;
    use crate::store::tests::at;
    use chrono::NaiveDate;

    fn dashboard() -> Dashboard<MemorySlots, RecordingNotifier> {
        Dashboard::open(MemorySlots::new(), RecordingNotifier::default())
    }

    fn form(name: &str, day: u32, company: &str, amount: &str) -> EntryForm {
        EntryForm {
            designer_name: name.to_string(),
            work_type: "Poster".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, day),
            company: company.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_submit_and_delete() -> anyhow::Result<()> {
        let mut dash = dashboard();
        let now = at(2024, 5, 15, 11, 0);

        let entry = dash.submit(&form("Asha", 1, "audi", "500"), now)?;
        let entry = entry.expect("entry should be stored");
        assert_eq!(dash.entries().len(), 1);

        dash.delete(&entry.id)?;
        assert!(dash.entries().is_empty());

        assert_eq!(
            dash.notifier().notices(),
            vec![
                Notice::Success("Work entry added successfully".to_string()),
                Notice::Success("Work entry deleted".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_invalid_submit_does_not_mutate() -> anyhow::Result<()> {
        let slots = MemorySlots::new();
        let mut dash = Dashboard::open(slots.clone(), RecordingNotifier::default());

        assert!(dash.submit(&form("Asha", 1, "audi", "lots"), Local::now())?.is_none());
        assert!(dash.entries().is_empty());
        assert_eq!(slots.get(crate::store::ENTRIES_SLOT)?, None);
        assert_eq!(
            dash.notifier().notices(),
            vec![Notice::Error(crate::form::FORM_ERROR.to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_add_company_notices() -> anyhow::Result<()> {
        let mut dash = dashboard();
        assert!(dash.add_company(" ")?.is_none());
        let company = dash.add_company("Tata Motors")?;
        assert_eq!(company.map(|c| c.value), Some("tata-motors".to_string()));
        assert_eq!(
            dash.notifier().notices()[1],
            Notice::Success("Added Tata Motors to companies".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_render_table() -> anyhow::Result<()> {
        let mut dash = dashboard();
        let empty = dash.render_table(SortState::default());
        assert!(empty.contains(EMPTY_TABLE));
        assert!(empty.contains("Total Payments: ₹0"));

        let now = at(2024, 5, 15, 11, 0);
        dash.submit(&form("Asha", 1, "mg-select", "1500"), now)?;
        dash.submit(&form("Ravi", 9, "new-client-co", "250.5"), now)?;

        let rendered = dash.render_table(SortState {
            field: SortField::Amount,
            direction: SortDirection::Desc,
        });
        assert!(rendered.contains("Amount v"));
        assert!(rendered.contains("MG Select"));
        assert!(rendered.contains("new client-co"));
        assert!(rendered.contains("May 1, 2024"));
        assert!(rendered.contains("Total Payments: ₹1,750.5"));
        assert!(rendered.find("Asha") < rendered.find("Ravi"));
        Ok(())
    }

    #[test]
    fn test_render_stats_and_charts() -> anyhow::Result<()> {
        let mut dash = dashboard();
        let now = at(2024, 5, 15, 11, 0);
        dash.submit(&form("Asha", 15, "audi", "1000"), now)?;
        dash.submit(&form("Ravi", 14, "kia", "3000"), now)?;

        let stats = dash.render_stats(now);
        assert!(stats.contains("Work items in May"));
        assert!(stats.contains("₹4,000"));
        assert!(stats.contains("₹2,000"));

        let daily = dash.render_daily_chart(now);
        assert!(daily.contains("May 09"));
        assert!(daily.contains("May 15"));
        assert!(!daily.contains("May 16"));

        let cumulative = dash.render_cumulative_chart(now);
        assert!(cumulative.contains("31"));
        assert!(cumulative.contains(&"#".repeat(CHART_WIDTH)));

        let full = dash.render(now, SortState::default());
        assert!(full.starts_with(TITLE));
        Ok(())
    }

    #[test]
    fn test_header() {
        let header = render_header(at(2024, 5, 1, 14, 5));
        assert!(header.contains("Wednesday  1 May 2024  2:05:00 PM"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "₹0");
        assert_eq!(format_amount(500.0), "₹500");
        assert_eq!(format_amount(1234567.0), "₹1,234,567");
        assert_eq!(format_amount(99.5), "₹99.5");
        assert_eq!(format_amount(1000.25), "₹1,000.25");
        assert_eq!(format_amount(-500.0), "₹-500");
        assert_eq!(format_amount(-1234.5), "₹-1,234.5");
        assert_eq!(format_amount(-0.001), "₹0");
        assert_eq!(format_amount(1e20), "₹100,000,000,000,000,000,000");
    }

    #[test]
    fn test_failed_save_notifies_error() -> anyhow::Result<()> {
        let mut dash = Dashboard::open(FailingSlots::default(), RecordingNotifier::default());

        match dash.submit(&form("Asha", 1, "audi", "500"), Local::now()) {
            Err(DashError::Storage(_)) => (),
            other => panic!("expected Storage error, got {:?}", other),
        }
        assert!(dash.entries().is_empty());
        assert_eq!(
            dash.notifier().notices(),
            vec![Notice::Error("Failed to save work entry".to_string())]
        );
        Ok(())
    }
}
