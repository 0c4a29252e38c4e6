//! Entity payloads
//!
//! Field names follow the persisted camelCase JSON. Optional fields are
//! written as `null` rather than skipped, so a stored record always lists
//! every field its shape knows about.

pub mod appointment;
pub mod calendar;
pub mod dentist;
pub mod invoice;
pub mod patient;
pub mod prescription;
pub mod treatment;

pub use appointment::{Appointment, AppointmentStatus, AppointmentType};
pub use calendar::{CalendarEvent, EventType};
pub use dentist::{Dentist, TimeRange};
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus};
pub use patient::{Address, EmergencyContact, Gender, Insurance, MedicalHistory, Patient};
pub use prescription::{Prescription, PrescriptionStatus};
pub use treatment::{Treatment, TreatmentPriority, TreatmentStatus, TreatmentType};
