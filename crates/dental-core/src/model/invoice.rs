//! Invoices

use crate::{Collection, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    /// Not yet settled nor past due
    pub fn is_pending(&self) -> bool {
        matches!(self, InvoiceStatus::Draft | InvoiceStatus::Sent)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
            InvoiceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub patient_id: String,
    #[serde(default)]
    pub appointment_id: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
    pub status: InvoiceStatus,
    pub due_date: String,
    #[serde(default)]
    pub paid_date: Option<String>,
    pub notes: String,
}

impl Entity for Invoice {
    const COLLECTION: Collection = Collection::Invoices;

    fn summary(&self) -> String {
        format!(
            "{:.2} [{}] due {} ({} items)",
            self.total,
            self.status,
            self.due_date,
            self.items.len()
        )
    }
}
