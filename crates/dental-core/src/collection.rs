//! Collection names and storage keys

use serde::{Deserialize, Serialize};

/// Storage key of the settings singleton
pub const SETTINGS_KEY: &str = "dental_app_settings";

/// Export name of the settings singleton
pub const SETTINGS_EXPORT_NAME: &str = "SETTINGS";

/// A persisted entity collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Patients,
    Appointments,
    Treatments,
    Prescriptions,
    Dentists,
    Invoices,
    CalendarEvents,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Patients,
        Collection::Appointments,
        Collection::Treatments,
        Collection::Prescriptions,
        Collection::Dentists,
        Collection::Invoices,
        Collection::CalendarEvents,
    ];

    /// Key the collection is persisted under
    pub fn storage_key(&self) -> &'static str {
        match self {
            Collection::Patients => "dental_app_patients",
            Collection::Appointments => "dental_app_appointments",
            Collection::Treatments => "dental_app_treatments",
            Collection::Prescriptions => "dental_app_prescriptions",
            Collection::Dentists => "dental_app_dentists",
            Collection::Invoices => "dental_app_invoices",
            Collection::CalendarEvents => "dental_app_calendar_events",
        }
    }

    /// Top-level name used in export documents
    pub fn export_name(&self) -> &'static str {
        match self {
            Collection::Patients => "PATIENTS",
            Collection::Appointments => "APPOINTMENTS",
            Collection::Treatments => "TREATMENTS",
            Collection::Prescriptions => "PRESCRIPTIONS",
            Collection::Dentists => "DENTISTS",
            Collection::Invoices => "INVOICES",
            Collection::CalendarEvents => "CALENDAR_EVENTS",
        }
    }

    pub fn from_export_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.export_name() == name)
    }
}

impl std::str::FromStr for Collection {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "patients" | "patient" => Ok(Collection::Patients),
            "appointments" | "appointment" => Ok(Collection::Appointments),
            "treatments" | "treatment" => Ok(Collection::Treatments),
            "prescriptions" | "prescription" => Ok(Collection::Prescriptions),
            "dentists" | "dentist" => Ok(Collection::Dentists),
            "invoices" | "invoice" => Ok(Collection::Invoices),
            "calendar_events" | "calendar_event" | "events" => Ok(Collection::CalendarEvents),
            _ => Err(crate::Error::UnknownCollection(s.to_string())),
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Patients => write!(f, "patients"),
            Collection::Appointments => write!(f, "appointments"),
            Collection::Treatments => write!(f, "treatments"),
            Collection::Prescriptions => write!(f, "prescriptions"),
            Collection::Dentists => write!(f, "dentists"),
            Collection::Invoices => write!(f, "invoices"),
            Collection::CalendarEvents => write!(f, "calendar-events"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection() {
        assert_eq!("patients".parse::<Collection>().unwrap(), Collection::Patients);
        assert_eq!("Invoice".parse::<Collection>().unwrap(), Collection::Invoices);
        assert_eq!(
            "calendar-events".parse::<Collection>().unwrap(),
            Collection::CalendarEvents
        );
        assert_eq!(
            "CALENDAR_EVENTS".parse::<Collection>().unwrap(),
            Collection::CalendarEvents
        );
        assert!("x-rays".parse::<Collection>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for collection in Collection::ALL {
            assert_eq!(collection.to_string().parse::<Collection>().unwrap(), collection);
            assert_eq!(
                Collection::from_export_name(collection.export_name()),
                Some(collection)
            );
        }
    }

    #[test]
    fn test_keys_are_distinct() {
        let mut keys: Vec<_> = Collection::ALL.iter().map(|c| c.storage_key()).collect();
        keys.push(SETTINGS_KEY);
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 8);
    }
}
