//! One storage substrate and the stores that work on it

use crate::dashboard::DashboardStats;
use crate::dataset::{self, ImportSummary};
use crate::model::{
    Appointment, CalendarEvent, Dentist, Invoice, Patient, Prescription, Treatment,
};
use crate::seed::{self, SeedReport};
use crate::settings::SettingsStore;
use crate::{Collection, Entity, RecordStore, Result, Storage};
use chrono::NaiveDate;

/// Entry point for callers: owns the substrate, hands out stores
pub struct Clinic<S> {
    storage: S,
}

impl<S: Storage> Clinic<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Wrap `storage` and seed the defaults if this is a first run
    pub fn open(storage: S) -> Result<Self> {
        let clinic = Self::new(storage);
        clinic.seed_defaults()?;
        Ok(clinic)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Store for any entity type
    pub fn records<E: Entity>(&self) -> RecordStore<'_, E, S> {
        RecordStore::new(&self.storage)
    }

    pub fn patients(&self) -> RecordStore<'_, Patient, S> {
        self.records()
    }

    pub fn appointments(&self) -> RecordStore<'_, Appointment, S> {
        self.records()
    }

    pub fn treatments(&self) -> RecordStore<'_, Treatment, S> {
        self.records()
    }

    pub fn prescriptions(&self) -> RecordStore<'_, Prescription, S> {
        self.records()
    }

    pub fn dentists(&self) -> RecordStore<'_, Dentist, S> {
        self.records()
    }

    pub fn invoices(&self) -> RecordStore<'_, Invoice, S> {
        self.records()
    }

    pub fn calendar_events(&self) -> RecordStore<'_, CalendarEvent, S> {
        self.records()
    }

    pub fn settings(&self) -> SettingsStore<'_, S> {
        SettingsStore::new(&self.storage)
    }

    /// Record count per collection
    pub fn counts(&self) -> Vec<(Collection, usize)> {
        Collection::ALL
            .into_iter()
            .map(|collection| {
                let count = match collection {
                    Collection::Patients => self.patients().len(),
                    Collection::Appointments => self.appointments().len(),
                    Collection::Treatments => self.treatments().len(),
                    Collection::Prescriptions => self.prescriptions().len(),
                    Collection::Dentists => self.dentists().len(),
                    Collection::Invoices => self.invoices().len(),
                    Collection::CalendarEvents => self.calendar_events().len(),
                };
                (collection, count)
            })
            .collect()
    }

    pub fn export_all(&self) -> Result<String> {
        dataset::export_all_data(&self.storage)
    }

    pub fn import(&self, document: &str) -> Result<ImportSummary> {
        dataset::import_data(&self.storage, document)
    }

    pub fn clear_all(&self) -> Result<()> {
        dataset::clear_all_data(&self.storage)
    }

    pub fn seed_defaults(&self) -> Result<SeedReport> {
        seed::seed_defaults(&self.storage)
    }

    pub fn dashboard(&self, today: NaiveDate) -> DashboardStats {
        DashboardStats::compute(&self.storage, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    #[test]
    fn test_open_seeds_once() {
        let clinic = Clinic::open(MemoryStorage::new()).unwrap();
        assert_eq!(clinic.dentists().len(), 1);
        assert!(clinic.settings().get().is_some());

        let clinic = Clinic::open(clinic.into_storage()).unwrap();
        assert_eq!(clinic.dentists().len(), 1);
    }

    #[test]
    fn test_new_does_not_seed() {
        let clinic = Clinic::new(MemoryStorage::new());
        assert!(clinic.dentists().is_empty());
        assert!(clinic.settings().get().is_none());
    }

    #[test]
    fn test_counts_and_clear() {
        let clinic = Clinic::open(MemoryStorage::new()).unwrap();
        clinic.patients().create(Patient::new("Jane", "Doe")).unwrap();

        let counts = clinic.counts();
        assert_eq!(counts[0], (Collection::Patients, 1));
        assert_eq!(counts[4], (Collection::Dentists, 1));

        clinic.clear_all().unwrap();
        assert!(clinic.counts().iter().all(|(_, n)| *n == 0));
        assert!(clinic.settings().get().is_none());
    }

    #[test]
    fn test_export_into_other_clinic() {
        let source = Clinic::open(MemoryStorage::new()).unwrap();
        source.patients().create(Patient::new("Jane", "Doe")).unwrap();

        let target = Clinic::new(MemoryStorage::new());
        target.import(&source.export_all().unwrap()).unwrap();

        assert_eq!(target.patients().read_all(), source.patients().read_all());
        assert_eq!(target.dentists().read_all(), source.dentists().read_all());
        assert_eq!(target.settings().get(), source.settings().get());
    }
}
