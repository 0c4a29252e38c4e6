//! Appointment records

use crate::{Collection, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentType {
    #[default]
    Consultation,
    Cleaning,
    Treatment,
    FollowUp,
    Emergency,
    Surgery,
}

impl std::fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentType::Consultation => write!(f, "consultation"),
            AppointmentType::Cleaning => write!(f, "cleaning"),
            AppointmentType::Treatment => write!(f, "treatment"),
            AppointmentType::FollowUp => write!(f, "follow-up"),
            AppointmentType::Emergency => write!(f, "emergency"),
            AppointmentType::Surgery => write!(f, "surgery"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in-progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no-show"),
        }
    }
}

/// A booked visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub patient_id: String,
    pub dentist_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    /// Minutes
    pub duration: u32,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub description: String,
    pub notes: String,
    pub cost: f64,
}

impl Entity for Appointment {
    const COLLECTION: Collection = Collection::Appointments;

    fn summary(&self) -> String {
        format!(
            "{} {} [{}] {} ({} min)",
            self.date, self.time, self.status, self.appointment_type, self.duration
        )
    }
}
