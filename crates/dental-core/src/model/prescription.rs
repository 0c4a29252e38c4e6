use crate::{Collection, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl std::fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrescriptionStatus::Active => write!(f, "active"),
            PrescriptionStatus::Completed => write!(f, "completed"),
            PrescriptionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub patient_id: String,
    #[serde(default)]
    pub appointment_id: Option<String>,
    pub dentist_id: String,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: String,
    pub status: PrescriptionStatus,
    pub prescribed_date: String,
}

impl Entity for Prescription {
    const COLLECTION: Collection = Collection::Prescriptions;

    fn summary(&self) -> String {
        format!(
            "{} {} {} [{}]",
            self.medication, self.dosage, self.frequency, self.status
        )
    }
}
