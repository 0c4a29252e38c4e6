//! Practitioners

use crate::{Collection, Entity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opening and closing time for one day, `HH:MM`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dentist {
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub specialty: Vec<String>,
    pub phone: String,
    pub email: String,
    /// Keyed by lowercase weekday name
    pub available_hours: BTreeMap<String, TimeRange>,
}

impl Dentist {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Dentist {
    const COLLECTION: Collection = Collection::Dentists;

    fn summary(&self) -> String {
        format!(
            "{} ({}) {}",
            self.full_name(),
            self.license_number,
            self.specialty.join(", ")
        )
    }
}
