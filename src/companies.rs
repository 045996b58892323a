use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{DashError, Result};
use crate::storage::Slots;

pub const COMPANIES_SLOT: &str = "companies";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub value: String,
    pub label: String,
}

impl Company {
    fn new(value: &str, label: &str) -> Self {
        Company {
            value: value.to_string(),
            label: label.to_string(),
        }
    }

    /// Builds a company from a user-typed name. The label is the trimmed
    /// name; the value is the whole name lowercased with every whitespace
    /// run, leading and trailing ones included, turned into one hyphen.
    pub fn from_name(raw_name: &str) -> Result<Self> {
        let label = raw_name.trim();
        if label.is_empty() {
            return Err(DashError::invalid_input("Company name cannot be empty"));
        }

        let mut value = String::with_capacity(raw_name.len());
        let mut in_space = false;
        for ch in raw_name.to_lowercase().chars() {
            if ch.is_whitespace() {
                if !in_space {
                    value.push('-');
                }
                in_space = true;
            } else {
                value.push(ch);
                in_space = false;
            }
        }
        Ok(Company {
            value,
            label: label.to_string(),
        })
    }
}

lazy_static! {
    static ref BUILT_IN: Vec<Company> = vec![
        Company::new("hyundai", "Hyundai"),
        Company::new("mahindra", "Mahindra"),
        Company::new("mahindra-bev", "Mahindra BEV"),
        Company::new("audi", "Audi"),
        Company::new("kia", "Kia"),
        Company::new("mg", "MG"),
        Company::new("mg-select", "MG Select"),
    ];
}

pub fn built_in() -> &'static [Company] {
    &BUILT_IN
}

fn is_built_in(value: &str) -> bool {
    BUILT_IN.iter().any(|c| c.value == value)
}

/// Built-in and user-added companies, kept apart so only the latter are
/// ever persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Companies {
    pub built_in: Vec<Company>,
    pub custom: Vec<Company>,
}

/// Built-ins first, then custom companies in the order they were added.
pub fn merge(companies: &Companies) -> Vec<Company> {
    companies
        .built_in
        .iter()
        .chain(companies.custom.iter())
        .cloned()
        .collect()
}

#[derive(Debug)]
pub struct CompanyRegistry<S: Slots> {
    slots: S,
    companies: Companies,
    merged: Vec<Company>,
}

impl<S: Slots> CompanyRegistry<S> {
    pub fn open(slots: S) -> Self {
        let companies = Companies {
            built_in: built_in().to_vec(),
            custom: read_custom(&slots),
        };
        let merged = merge(&companies);
        CompanyRegistry {
            slots,
            companies,
            merged,
        }
    }

    /// Re-reads the custom slot and returns the merged list.
    pub fn load(&mut self) -> &[Company] {
        self.companies.custom = read_custom(&self.slots);
        self.merged = merge(&self.companies);
        &self.merged
    }

    pub fn all(&self) -> &[Company] {
        &self.merged
    }

    pub fn custom(&self) -> &[Company] {
        &self.companies.custom
    }

    /// Adds a company. Duplicate values are allowed.
    pub fn add(&mut self, raw_name: &str) -> Result<Company> {
        let company = Company::from_name(raw_name)?;

        let mut custom = self.companies.custom.clone();
        custom.push(company.clone());
        // A name that normalizes onto a built-in value is shown but not saved.
        let persisted: Vec<&Company> = custom.iter().filter(|c| !is_built_in(&c.value)).collect();
        let text = serde_json::to_string(&persisted).map_err(DashError::Encode)?;
        self.slots.set(COMPANIES_SLOT, &text)?;

        self.companies.custom = custom;
        self.merged = merge(&self.companies);
        info!(value = %company.value, label = %company.label, "company added");
        Ok(company)
    }

    pub fn find(&self, value: &str) -> Option<&Company> {
        self.merged.iter().find(|c| c.value == value)
    }

    /// Display label for a company value. Unknown values fall back to the
    /// value with its first hyphen turned into a space.
    pub fn label_for(&self, value: &str) -> String {
        match self.find(value) {
            Some(company) => company.label.clone(),
            None => value.replacen('-', " ", 1),
        }
    }

    pub fn search(&self, query: &str) -> Vec<&Company> {
        let query = query.trim().to_lowercase();
        self.merged
            .iter()
            .filter(|c| {
                c.label.to_lowercase().contains(&query) || c.value.contains(&query)
            })
            .collect()
    }

    pub fn into_slots(self) -> S {
        self.slots
    }
}

fn read_custom<S: Slots>(slots: &S) -> Vec<Company> {
    let text = match slots.get(COMPANIES_SLOT) {
        Ok(Some(text)) => text,
        Ok(None) => return Vec::new(),
        Err(e) => {
            error!(slot = COMPANIES_SLOT, error = %e, "failed to read saved companies");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Company>>(&text) {
        Ok(custom) => {
            debug!(count = custom.len(), "custom companies loaded");
            custom
        }
        Err(source) => {
            let e = DashError::PersistedStateCorrupt {
                slot: COMPANIES_SLOT.to_string(),
                source,
            };
            error!(error = ?e, "failed to parse saved companies");
            Vec::new()
        }
    }
}
