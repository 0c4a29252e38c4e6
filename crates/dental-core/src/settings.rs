//! Practice settings
//!
//! A singleton object under its own key: no id, no timestamps.

use crate::collection::SETTINGS_KEY;
use crate::record::merge_known;
use crate::{Error, Fields, Result, Storage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PracticeInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkingDay {
    pub start: String,
    pub end: String,
    pub is_open: bool,
}

impl WorkingDay {
    pub fn open(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            is_open: true,
        }
    }

    pub fn closed() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSettings {
    /// Minutes
    pub default_duration: u32,
    /// Minutes between appointments
    pub buffer_time: u32,
    /// Days ahead bookings are accepted
    pub max_advance_booking: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BillingSettings {
    pub currency: String,
    /// Fraction, e.g. 0.08
    pub tax_rate: f64,
    pub late_fee_policy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub practice_info: PracticeInfo,
    /// Keyed by lowercase weekday name
    pub working_hours: BTreeMap<String, WorkingDay>,
    pub appointment_settings: AppointmentSettings,
    pub billing_settings: BillingSettings,
}

/// Read/replace/merge access to the settings singleton
pub struct SettingsStore<'a, S: ?Sized> {
    storage: &'a S,
}

impl<'a, S: Storage + ?Sized> SettingsStore<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Current settings; absent or unreadable settings are `None`
    pub fn get(&self) -> Option<Settings> {
        let text = self.storage.get_item(SETTINGS_KEY)?;
        match serde_json::from_str(&text) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("Error reading settings: {}", e);
                None
            }
        }
    }

    /// Replace the settings object
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let text = serde_json::to_string(settings)?;
        self.storage
            .set_item(SETTINGS_KEY, &text)
            .inspect_err(|e| tracing::error!("Error saving settings: {}", e))
    }

    /// Shallow-merge top-level sections of `patch` into the current settings
    ///
    /// Returns `Ok(None)` when there are no settings to merge into.
    pub fn update(&self, patch: &Fields) -> Result<Option<Settings>> {
        let Some(current) = self.get() else {
            return Ok(None);
        };

        let Value::Object(mut merged) = serde_json::to_value(&current)? else {
            return Err(Error::Other("settings are not an object".to_string()));
        };
        merge_known(&mut merged, patch, &[], "settings")?;

        let updated: Settings = serde_json::from_value(Value::Object(merged))
            .map_err(|e| Error::Format(format!("invalid settings update: {e}")))?;
        self.save(&updated)?;
        Ok(Some(updated))
    }

    /// Remove the settings object; [`crate::seed::default_settings`] gives
    /// a fresh one
    pub fn reset(&self) -> Result<()> {
        self.storage.remove_item(SETTINGS_KEY)
    }
}
