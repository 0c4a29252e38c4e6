//! Treatment plans and procedures

use crate::{Collection, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TreatmentType {
    #[default]
    Preventive,
    Restorative,
    Surgical,
    Orthodontic,
    Cosmetic,
}

impl std::fmt::Display for TreatmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreatmentType::Preventive => write!(f, "preventive"),
            TreatmentType::Restorative => write!(f, "restorative"),
            TreatmentType::Surgical => write!(f, "surgical"),
            TreatmentType::Orthodontic => write!(f, "orthodontic"),
            TreatmentType::Cosmetic => write!(f, "cosmetic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TreatmentStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl TreatmentStatus {
    /// Planned or under way
    pub fn is_pending(&self) -> bool {
        matches!(self, TreatmentStatus::Planned | TreatmentStatus::InProgress)
    }
}

impl std::fmt::Display for TreatmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreatmentStatus::Planned => write!(f, "planned"),
            TreatmentStatus::InProgress => write!(f, "in-progress"),
            TreatmentStatus::Completed => write!(f, "completed"),
            TreatmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for TreatmentPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreatmentPriority::Low => write!(f, "low"),
            TreatmentPriority::Medium => write!(f, "medium"),
            TreatmentPriority::High => write!(f, "high"),
            TreatmentPriority::Urgent => write!(f, "urgent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub patient_id: String,
    #[serde(default)]
    pub appointment_id: Option<String>,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub treatment_type: TreatmentType,
    pub status: TreatmentStatus,
    pub priority: TreatmentPriority,
    pub cost: f64,
    /// Estimated minutes
    pub duration: u32,
    pub notes: String,
}

impl Entity for Treatment {
    const COLLECTION: Collection = Collection::Treatments;

    fn summary(&self) -> String {
        format!(
            "{} [{}] [{}] {}",
            self.name, self.status, self.priority, self.treatment_type
        )
    }
}
