use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::DashError;
use crate::WorkEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    DesignerName,
    Date,
    Company,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortField {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "designer" | "designername" | "name" => Ok(SortField::DesignerName),
            "date" => Ok(SortField::Date),
            "company" => Ok(SortField::Company),
            "amount" => Ok(SortField::Amount),
            _ => Err(DashError::invalid_input(format!("Unknown sort field: {}", s))),
        }
    }
}

impl FromStr for SortDirection {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(DashError::invalid_input(format!("Unknown sort direction: {}", s))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortField::DesignerName => "Designer Name",
            SortField::Date => "Date",
            SortField::Company => "Company",
            SortField::Amount => "Amount",
        };
        write!(f, "{}", name)
    }
}

/// Current table ordering. Starts newest date first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        SortState {
            field: SortField::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Header click: the same field flips direction, a new field starts ascending.
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            SortState {
                field,
                direction: self.direction.flip(),
            }
        } else {
            SortState {
                field,
                direction: SortDirection::Asc,
            }
        }
    }

    pub fn apply(&self, entries: &[WorkEntry]) -> Vec<WorkEntry> {
        sort_entries(entries, self.field, self.direction)
    }
}

fn compare(a: &WorkEntry, b: &WorkEntry, field: SortField) -> Ordering {
    match field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::Amount => a.amount.total_cmp(&b.amount),
        SortField::DesignerName => a
            .designer_name
            .to_lowercase()
            .cmp(&b.designer_name.to_lowercase()),
        SortField::Company => a.company.to_lowercase().cmp(&b.company.to_lowercase()),
    }
}

/// Returns a sorted copy. The sort is stable in both directions.
pub fn sort_entries(
    entries: &[WorkEntry],
    field: SortField,
    direction: SortDirection,
) -> Vec<WorkEntry> {
    let mut sorted = entries.to_vec();
    match direction {
        SortDirection::Asc => sorted.sort_by(|a, b| compare(a, b, field)),
        SortDirection::Desc => sorted.sort_by(|a, b| compare(b, a, field)),
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::SortDirection::{Asc, Desc};
    use super::*;
    use crate::store::tests::{at, fake_entry};

    fn ids(entries: &[WorkEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    fn order(entries: &[WorkEntry], field: SortField, direction: SortDirection) -> Vec<String> {
        sort_entries(entries, field, direction)
            .into_iter()
            .map(|e| e.id)
            .collect()
    }

    fn sample() -> Vec<WorkEntry> {
        let rows = [
            ("a", "meera", "kia", 300.0, 3),
            ("b", "Arjun", "Audi", 100.0, 1),
            ("c", "bina", "mg", 200.0, 2),
        ];
        rows.iter()
            .map(|(id, name, company, amount, day)| {
                let mut e = fake_entry(at(2024, 6, *day, 9, 0));
                e.id = id.to_string();
                e.designer_name = name.to_string();
                e.company = company.to_string();
                e.amount = *amount;
                e
            })
            .collect()
    }

    #[test]
    fn test_sort_by_each_field() {
        let entries = sample();
        assert_eq!(order(&entries, SortField::DesignerName, Asc), vec!["b", "c", "a"]);
        assert_eq!(order(&entries, SortField::Company, Asc), vec!["b", "a", "c"]);
        assert_eq!(order(&entries, SortField::Date, Desc), vec!["a", "c", "b"]);
        assert_eq!(order(&entries, SortField::Amount, Asc), vec!["b", "c", "a"]);
        assert_eq!(ids(&entries), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_is_permutation() {
        let entries: Vec<WorkEntry> = (1..=12).map(|d| fake_entry(at(2024, 7, d, 8, 0))).collect();
        let mut expected = ids(&entries);
        expected.sort_unstable();

        let fields = [
            SortField::DesignerName,
            SortField::Date,
            SortField::Company,
            SortField::Amount,
        ];
        for field in &fields {
            for direction in &[Asc, Desc] {
                let sorted = sort_entries(&entries, *field, *direction);
                let mut got = ids(&sorted);
                got.sort_unstable();
                assert_eq!(got, expected);
            }
        }
    }

    #[test]
    fn test_amount_desc_is_reversed_asc() {
        let entries = sample();
        let mut asc = sort_entries(&entries, SortField::Amount, SortDirection::Asc);
        asc.reverse();
        assert_eq!(asc, sort_entries(&entries, SortField::Amount, SortDirection::Desc));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut entries = sample();
        for e in entries.iter_mut() {
            e.company = "audi".to_string();
        }
        assert_eq!(order(&entries, SortField::Company, Asc), vec!["a", "b", "c"]);
        assert_eq!(order(&entries, SortField::Company, Desc), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_toggle() {
        let state = SortState::default();
        assert_eq!(state.field, SortField::Date);
        assert_eq!(state.direction, SortDirection::Desc);

        let state = state.toggle(SortField::Date);
        assert_eq!(state.direction, SortDirection::Asc);

        let state = state.toggle(SortField::Amount);
        assert_eq!(state, SortState { field: SortField::Amount, direction: SortDirection::Asc });
        assert_eq!(state.toggle(SortField::Amount).direction, SortDirection::Desc);
    }

    #[test]
    fn test_parse() {
        assert_eq!("designerName".parse::<SortField>().ok(), Some(SortField::DesignerName));
        assert_eq!("AMOUNT".parse::<SortField>().ok(), Some(SortField::Amount));
        assert!("workType".parse::<SortField>().is_err());
        assert_eq!("desc".parse::<SortDirection>().ok(), Some(SortDirection::Desc));
    }
}
