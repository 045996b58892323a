#[macro_use]
extern crate prettytable;
#[macro_use]
extern crate lazy_static;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

pub mod clock;
pub mod companies;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod sort;
pub mod stats;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use companies::{Company, CompanyRegistry};
pub use dashboard::{ConsoleNotifier, Dashboard, Notifier};
pub use error::{DashError, Result};
pub use form::EntryForm;
pub use sort::{sort_entries, SortDirection, SortField, SortState};
pub use storage::{FileSlots, MemorySlots, Slots};
pub use store::EntryStore;

/// One piece of design work assigned to a designer.
///
/// Entries are immutable once created; the store only ever adds or removes
/// whole records. `date` is the day the work was assigned, `created_at` is
/// when the record itself was made.
///
/// Saved records are read leniently: missing or `null` text fields load as
/// empty strings and a missing or `null` amount loads as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkEntry {
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub designer_name: String,
    #[serde(default, deserialize_with = "or_default")]
    pub work_type: String,
    pub date: DateTime<Local>,
    #[serde(default, deserialize_with = "or_default")]
    pub company: String,
    #[serde(default, deserialize_with = "or_default")]
    pub amount: f64,
    pub created_at: DateTime<Local>,
}

fn or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl WorkEntry {
    /// Calendar day of `date` in local time.
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}
