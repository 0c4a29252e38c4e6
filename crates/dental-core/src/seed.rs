//! First-run default data

use crate::model::{Dentist, Patient, TimeRange};
use crate::settings::{
    AppointmentSettings, BillingSettings, PracticeInfo, Settings, SettingsStore, WorkingDay,
};
use crate::{RecordStore, Result, Storage};
use serde::Serialize;
use std::collections::BTreeMap;

const WEEKDAYS: [&str; 5] = ["monday", "tuesday", "wednesday", "thursday", "friday"];

/// What seeding created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// ID of the default dentist, if one was created
    pub dentist_id: Option<String>,
    pub settings: bool,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.dentist_id.is_none() && !self.settings
    }
}

pub fn default_dentist() -> Dentist {
    let mut hours: BTreeMap<String, TimeRange> = WEEKDAYS
        .iter()
        .map(|day| (day.to_string(), TimeRange::new("09:00", "17:00")))
        .collect();
    hours.insert("saturday".into(), TimeRange::new("09:00", "13:00"));
    hours.insert("sunday".into(), TimeRange::default());

    Dentist {
        first_name: "Dr. John".into(),
        last_name: "Smith".into(),
        license_number: "DEN123456".into(),
        specialty: vec!["General Dentistry".into()],
        phone: "(555) 123-4567".into(),
        email: "dr.smith@dentistapp.com".into(),
        available_hours: hours,
    }
}

pub fn default_settings() -> Settings {
    let mut hours: BTreeMap<String, WorkingDay> = WEEKDAYS
        .iter()
        .map(|day| (day.to_string(), WorkingDay::open("09:00", "17:00")))
        .collect();
    hours.insert("saturday".into(), WorkingDay::open("09:00", "13:00"));
    hours.insert("sunday".into(), WorkingDay::closed());

    Settings {
        practice_info: PracticeInfo {
            name: "New Clean Dental Practice".into(),
            address: "123 Main Street, City, State 12345".into(),
            phone: "(555) 123-4567".into(),
            email: "info@newcleandental.com".into(),
            website: Some("www.newcleandental.com".into()),
        },
        working_hours: hours,
        appointment_settings: AppointmentSettings {
            default_duration: 60,
            buffer_time: 15,
            max_advance_booking: 90,
        },
        billing_settings: BillingSettings {
            currency: "USD".into(),
            tax_rate: 0.08,
            late_fee_policy: "Late fees apply after 30 days".into(),
        },
    }
}

/// Seed the default dentist and settings on first run
///
/// First run means no patients. Each default is only written when its own
/// slot is still empty, so reseeding after patients are cleared does not
/// duplicate the dentist.
pub fn seed_defaults<S: Storage + ?Sized>(storage: &S) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    if !RecordStore::<Patient, S>::new(storage).is_empty() {
        return Ok(report);
    }

    let dentists = RecordStore::<Dentist, S>::new(storage);
    if dentists.is_empty() {
        let dentist = dentists.create(default_dentist())?;
        report.dentist_id = Some(dentist.id);
    }

    let settings = SettingsStore::new(storage);
    if settings.get().is_none() {
        settings.save(&default_settings())?;
        report.settings = true;
    }

    if !report.is_empty() {
        tracing::info!(
            "Seeded defaults (dentist: {}, settings: {})",
            report.dentist_id.is_some(),
            report.settings
        );
    }
    Ok(report)
}
