//! Practice overview numbers

use crate::model::{Appointment, Invoice, Patient, Treatment};
use crate::{Record, RecordStore, Storage};
use chrono::NaiveDate;
use serde::Serialize;

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_patients: usize,
    pub today_appointments: usize,
    /// Planned or in progress
    pub pending_treatments: usize,
    /// Draft or sent
    pub pending_invoices: usize,
    /// Newest first
    pub recent_patients: Vec<Record<Patient>>,
    /// Today onwards, by date then time
    pub upcoming_appointments: Vec<Record<Appointment>>,
}

impl DashboardStats {
    pub fn compute<S: Storage + ?Sized>(storage: &S, today: NaiveDate) -> Self {
        let mut patients = RecordStore::<Patient, S>::new(storage).read_all();
        let appointments = RecordStore::<Appointment, S>::new(storage).read_all();
        let treatments = RecordStore::<Treatment, S>::new(storage).read_all();
        let invoices = RecordStore::<Invoice, S>::new(storage).read_all();

        // Dates are stored as YYYY-MM-DD, so text order is date order
        let today = today.format("%Y-%m-%d").to_string();

        let total_patients = patients.len();
        // Later insertions win ties on creation time
        patients.reverse();
        patients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        patients.truncate(RECENT_LIMIT);

        let today_appointments = appointments.iter().filter(|a| a.date == today).count();
        let mut upcoming: Vec<_> = appointments
            .into_iter()
            .filter(|a| a.date >= today)
            .collect();
        upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
        upcoming.truncate(RECENT_LIMIT);

        Self {
            total_patients,
            today_appointments,
            pending_treatments: treatments.iter().filter(|t| t.status.is_pending()).count(),
            pending_invoices: invoices.iter().filter(|i| i.status.is_pending()).count(),
            recent_patients: patients,
            upcoming_appointments: upcoming,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use crate::model::{InvoiceStatus, TreatmentStatus};

    fn appointment(date: &str, time: &str) -> Appointment {
        Appointment {
            date: date.into(),
            time: time.into(),
            ..Appointment::default()
        }
    }

    #[test]
    fn test_compute() {
        let storage = MemoryStorage::new();
        let patients = RecordStore::<Patient, _>::new(&storage);
        for i in 0..7 {
            patients.create(Patient::new(format!("P{i}"), "X")).unwrap();
        }

        let appointments = RecordStore::<Appointment, _>::new(&storage);
        for (date, time) in [
            ("2024-05-01", "09:00"),
            ("2024-05-02", "08:00"),
            ("2024-05-01", "08:30"),
            ("2024-04-30", "10:00"),
        ] {
            appointments.create(appointment(date, time)).unwrap();
        }

        let treatments = RecordStore::<Treatment, _>::new(&storage);
        for status in [
            TreatmentStatus::Planned,
            TreatmentStatus::InProgress,
            TreatmentStatus::Completed,
        ] {
            treatments
                .create(Treatment {
                    status,
                    ..Treatment::default()
                })
                .unwrap();
        }

        let invoices = RecordStore::<Invoice, _>::new(&storage);
        for status in [InvoiceStatus::Draft, InvoiceStatus::Paid, InvoiceStatus::Overdue] {
            invoices
                .create(Invoice {
                    status,
                    ..Invoice::default()
                })
                .unwrap();
        }

        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let stats = DashboardStats::compute(&storage, today);

        assert_eq!(stats.total_patients, 7);
        assert_eq!(stats.recent_patients.len(), 5);
        assert_eq!(stats.recent_patients[0].first_name, "P6");
        assert_eq!(stats.today_appointments, 2);
        assert_eq!(stats.pending_treatments, 2);
        assert_eq!(stats.pending_invoices, 1);

        let upcoming: Vec<_> = stats
            .upcoming_appointments
            .iter()
            .map(|a| (a.date.as_str(), a.time.as_str()))
            .collect();
        assert_eq!(
            upcoming,
            [("2024-05-01", "08:30"), ("2024-05-01", "09:00"), ("2024-05-02", "08:00")]
        );
    }

    #[test]
    fn test_compute_empty() {
        let storage = MemoryStorage::new();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let stats = DashboardStats::compute(&storage, today);
        assert_eq!(stats.total_patients, 0);
        assert!(stats.upcoming_appointments.is_empty());
    }
}
