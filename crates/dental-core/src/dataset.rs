//! Whole-dataset export, import and reset
//!
//! The export document is one JSON object keyed by collection export name
//! (`PATIENTS`, `APPOINTMENTS`, ..., `SETTINGS`).

use crate::collection::{SETTINGS_EXPORT_NAME, SETTINGS_KEY};
use crate::{Collection, Error, Result, Storage};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

/// What an import applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Collections replaced, with their new record counts
    pub collections: Vec<(Collection, usize)>,
    /// Whether settings were replaced or removed
    pub settings: bool,
    /// Top-level keys that named nothing known
    pub ignored: Vec<String>,
}

/// Parse persisted text for export; unreadable data exports as `fallback`
fn read_raw<S: Storage + ?Sized>(storage: &S, key: &str, fallback: Value) -> Value {
    let Some(text) = storage.get_item(key) else {
        return fallback;
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Error reading {} for export: {}", key, e);
            fallback
        }
    }
}

/// Export every collection and the settings as pretty-printed JSON
pub fn export_all_data<S: Storage + ?Sized>(storage: &S) -> Result<String> {
    let mut data = Map::new();
    for collection in Collection::ALL {
        let items = read_raw(storage, collection.storage_key(), Value::Array(Vec::new()));
        data.insert(collection.export_name().to_string(), items);
    }
    data.insert(
        SETTINGS_EXPORT_NAME.to_string(),
        read_raw(storage, SETTINGS_KEY, Value::Null),
    );

    Ok(serde_json::to_string_pretty(&Value::Object(data))?)
}

/// Replace collections wholesale from an export document
///
/// Record shapes are not checked. Keys applied before a failing key stay
/// applied.
pub fn import_data<S: Storage + ?Sized>(storage: &S, document: &str) -> Result<ImportSummary> {
    let data: Value = serde_json::from_str(document).map_err(|e| {
        tracing::error!("Error importing data: {}", e);
        Error::Format(format!("import is not valid JSON: {e}"))
    })?;
    let Value::Object(data) = data else {
        return Err(Error::Format(
            "import must be a JSON object keyed by collection".to_string(),
        ));
    };

    let mut summary = ImportSummary::default();
    for (name, value) in &data {
        if name == SETTINGS_EXPORT_NAME {
            match value {
                Value::Null => storage.remove_item(SETTINGS_KEY)?,
                Value::Object(_) => storage.set_item(SETTINGS_KEY, &value.to_string())?,
                _ => {
                    return Err(Error::Format(format!("{name} must be an object or null")));
                }
            }
            summary.settings = true;
            continue;
        }

        let Some(collection) = Collection::from_export_name(name) else {
            summary.ignored.push(name.clone());
            continue;
        };
        let Value::Array(items) = value else {
            return Err(Error::Format(format!("{name} must be an array")));
        };
        storage.set_item(collection.storage_key(), &value.to_string())?;
        summary.collections.push((collection, items.len()));
    }

    tracing::info!(
        "Imported {} collections ({} keys ignored)",
        summary.collections.len(),
        summary.ignored.len()
    );
    Ok(summary)
}

/// Remove every collection and the settings
pub fn clear_all_data<S: Storage + ?Sized>(storage: &S) -> Result<()> {
    for collection in Collection::ALL {
        storage.remove_item(collection.storage_key())?;
    }
    storage.remove_item(SETTINGS_KEY)?;
    tracing::info!("Cleared all data");
    Ok(())
}

/// `<prefix>-<YYYY-MM-DD>.json`
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.json", prefix, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dentist, Patient};
    use crate::settings::{Settings, SettingsStore};
    use crate::{MemoryStorage, RecordStore};
    use serde_json::json;

    fn snapshot(storage: &MemoryStorage) -> Vec<Option<Value>> {
        Collection::ALL
            .iter()
            .map(|c| c.storage_key())
            .chain([SETTINGS_KEY])
            .map(|key| {
                storage
                    .get_item(key)
                    .map(|text| serde_json::from_str(&text).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_export_shape() {
        let storage = MemoryStorage::new();
        RecordStore::<Patient, _>::new(&storage)
            .create(Patient::new("Jane", "Doe"))
            .unwrap();

        let exported: Value = serde_json::from_str(&export_all_data(&storage).unwrap()).unwrap();
        assert_eq!(exported["PATIENTS"].as_array().unwrap().len(), 1);
        assert_eq!(exported["INVOICES"], json!([]));
        assert_eq!(exported["CALENDAR_EVENTS"], json!([]));
        assert_eq!(exported["SETTINGS"], Value::Null);
        assert_eq!(exported.as_object().unwrap().len(), 8);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let storage = MemoryStorage::new();
        RecordStore::<Patient, _>::new(&storage)
            .create(Patient::new("Jane", "Doe"))
            .unwrap();
        RecordStore::<Dentist, _>::new(&storage)
            .create(Dentist::default())
            .unwrap();
        SettingsStore::new(&storage).save(&Settings::default()).unwrap();

        let before = snapshot(&storage);
        let exported = export_all_data(&storage).unwrap();

        let fresh = MemoryStorage::new();
        import_data(&fresh, &exported).unwrap();
        // Absent collections come back as empty arrays
        let after: Vec<_> = snapshot(&fresh)
            .into_iter()
            .zip(&before)
            .map(|(after, before)| match (after, before) {
                (Some(Value::Array(a)), None) if a.is_empty() => None,
                (after, _) => after,
            })
            .collect();
        assert_eq!(after, before);

        import_data(&storage, &exported).unwrap();
        let again = snapshot(&storage);
        assert_eq!(again[0], before[0]);
        assert_eq!(again[4], before[4]);
        assert_eq!(again[7], before[7]);
    }

    #[test]
    fn test_import_replaces_and_ignores_unknown() {
        let storage = MemoryStorage::new();
        let patients = RecordStore::<Patient, _>::new(&storage);
        patients.create(Patient::new("Old", "Record")).unwrap();

        let summary = import_data(&storage, r#"{"PATIENTS": [], "XRAYS": [1], "SETTINGS": null}"#)
            .unwrap();
        assert!(patients.read_all().is_empty());
        assert_eq!(summary.collections, vec![(Collection::Patients, 0)]);
        assert_eq!(summary.ignored, vec!["XRAYS".to_string()]);
        assert!(summary.settings);
    }

    #[test]
    fn test_import_rejects_bad_documents() {
        let storage = MemoryStorage::new();
        assert!(matches!(import_data(&storage, "not json"), Err(Error::Format(_))));
        assert!(matches!(import_data(&storage, "[1, 2]"), Err(Error::Format(_))));
        assert!(matches!(
            import_data(&storage, r#"{"PATIENTS": {"a": 1}}"#),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            import_data(&storage, r#"{"SETTINGS": "loud"}"#),
            Err(Error::Format(_))
        ));
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn test_import_does_not_validate_record_shape() {
        let storage = MemoryStorage::new();
        import_data(&storage, r#"{"PATIENTS": [{"id": "x", "bogus": true}]}"#).unwrap();

        // Malformed records surface on read, as an empty collection
        assert!(storage.get_item(Collection::Patients.storage_key()).is_some());
        assert!(RecordStore::<Patient, _>::new(&storage).read_all().is_empty());
    }

    #[test]
    fn test_clear_all_data() {
        let storage = MemoryStorage::new();
        RecordStore::<Patient, _>::new(&storage)
            .create(Patient::new("Jane", "Doe"))
            .unwrap();
        SettingsStore::new(&storage).save(&Settings::default()).unwrap();
        storage.set_item("unrelated", "1").unwrap();

        clear_all_data(&storage).unwrap();
        assert_eq!(storage.keys(), vec!["unrelated".to_string()]);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name("dental-data", date), "dental-data-2024-03-09.json");
    }
}
