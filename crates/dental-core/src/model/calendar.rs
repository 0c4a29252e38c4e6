//! Calendar entries
//!
//! Calendar events are the one collection the store does not timestamp.

use crate::{Collection, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Appointment,
    Reminder,
    Block,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Appointment => write!(f, "appointment"),
            EventType::Reminder => write!(f, "reminder"),
            EventType::Block => write!(f, "block"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    pub duration: u32,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub dentist_id: Option<String>,
    pub description: String,
    pub color: String,
}

impl Entity for CalendarEvent {
    const COLLECTION: Collection = Collection::CalendarEvents;
    const TIMESTAMPED: bool = false;

    fn summary(&self) -> String {
        format!("{} {} [{}] {}", self.date, self.time, self.event_type, self.title)
    }
}
