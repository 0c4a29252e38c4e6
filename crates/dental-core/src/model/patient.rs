//! Patient records

use crate::{Collection, Entity};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistory {
    pub allergies: Vec<String>,
    pub medications: Vec<String>,
    pub conditions: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Insurance {
    pub provider: String,
    pub policy_number: String,
    pub group_number: String,
}

/// A patient of the practice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub gender: Gender,
    pub phone: String,
    pub email: String,
    pub address: Address,
    pub emergency_contact: EmergencyContact,
    pub medical_history: MedicalHistory,
    #[serde(default)]
    pub insurance: Option<Insurance>,
}

impl Patient {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Quick filter used by the patient list: name, phone or email
    pub fn matches_term(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let lowered = term.to_lowercase();
        self.full_name().to_lowercase().contains(&lowered)
            || self.phone.contains(term)
            || self.email.to_lowercase().contains(&lowered)
    }

    /// Age in whole years on `today`, if the birth date parses
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let born = NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d").ok()?;
        let mut age = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }
}

impl Entity for Patient {
    const COLLECTION: Collection = Collection::Patients;

    fn summary(&self) -> String {
        format!("{} ({}) {}", self.full_name(), self.gender, self.phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_term() {
        let mut patient = Patient::new("Jane", "Doe");
        patient.phone = "(555) 010-2000".into();
        patient.email = "Jane.Doe@example.com".into();

        assert!(patient.matches_term(""));
        assert!(patient.matches_term("jane d"));
        assert!(patient.matches_term("010-2"));
        assert!(patient.matches_term("EXAMPLE.com"));
        assert!(!patient.matches_term("roe"));
    }

    #[test]
    fn test_age_on() {
        let mut patient = Patient::new("Jane", "Doe");
        patient.date_of_birth = "1990-06-15".into();

        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(patient.age_on(day(2020, 6, 14)), Some(29));
        assert_eq!(patient.age_on(day(2020, 6, 15)), Some(30));
        assert_eq!(patient.age_on(day(1980, 1, 1)), None);

        patient.date_of_birth = String::new();
        assert_eq!(patient.age_on(day(2020, 1, 1)), None);
    }

    #[test]
    fn test_optional_insurance_is_persisted_as_null() {
        let value = serde_json::to_value(Patient::new("A", "B")).unwrap();
        assert!(value.get("insurance").unwrap().is_null());
        assert_eq!(value["address"]["zipCode"], "");
    }
}
