//! Generic record store
//!
//! One [`RecordStore`] per entity type. Each operation reads the whole
//! collection from the substrate, works on it, and writes it back. Nothing
//! is cached between calls.
//!
//! Writes work on the raw JSON items, so records that do not fit `E` (for
//! example ones brought in by an import) are skipped on read but written
//! back untouched.

use crate::record::{MANAGED_FIELDS, merge_known};
use crate::{Criteria, Entity, Error, Fields, Record, Result, Storage, generate_id};
use chrono::Utc;
use serde_json::Value;
use std::marker::PhantomData;

/// CRUD and linear search over one collection
pub struct RecordStore<'a, E, S: ?Sized> {
    storage: &'a S,
    _entity: PhantomData<E>,
}

fn has_id(item: &Value, id: &str) -> bool {
    item.get("id").and_then(Value::as_str) == Some(id)
}

impl<'a, E: Entity, S: Storage + ?Sized> RecordStore<'a, E, S> {
    pub fn new(storage: &'a S) -> Self {
        Self {
            storage,
            _entity: PhantomData,
        }
    }

    /// Key the collection lives under
    pub fn key(&self) -> &'static str {
        E::COLLECTION.storage_key()
    }

    /// Persisted items as they are stored
    ///
    /// Fails with [`Error::Format`] when the stored text is not a JSON array;
    /// writers must not replace data they could not read.
    fn load_raw(&self) -> Result<Vec<Value>> {
        let Some(text) = self.storage.get_item(self.key()) else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&text)
            .map_err(|e| Error::Format(format!("{} is not a JSON array: {e}", self.key())))
    }

    fn parse(&self, item: Value) -> Option<Record<E>> {
        match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed record in {}: {}", self.key(), e);
                None
            }
        }
    }

    /// Load the records that fit `E`; absent or unreadable data is empty
    fn load(&self) -> Vec<Record<E>> {
        match self.load_raw() {
            Ok(items) => items.into_iter().filter_map(|item| self.parse(item)).collect(),
            Err(e) => {
                tracing::warn!("Error reading {}: {}", self.key(), e);
                Vec::new()
            }
        }
    }

    fn save(&self, items: &[Value]) -> Result<()> {
        let text = serde_json::to_string(items)?;
        self.storage.set_item(self.key(), &text).inspect_err(|e| {
            tracing::error!("Error saving {}: {}", self.key(), e);
        })
    }

    /// Raw items plus the parsed record with `id`, if there is one
    fn load_for_update(&self, id: &str) -> Result<Option<(Vec<Value>, usize, Record<E>)>> {
        let items = self.load_raw()?;
        let Some(index) = items.iter().position(|item| has_id(item, id)) else {
            return Ok(None);
        };
        let record = self.parse(items[index].clone()).ok_or_else(|| {
            Error::Format(format!("{} record {} is malformed", E::COLLECTION, id))
        })?;
        Ok(Some((items, index, record)))
    }

    /// Create a record from its payload, assigning id and timestamps
    pub fn create(&self, fields: E) -> Result<Record<E>> {
        let now = E::TIMESTAMPED.then(Utc::now);
        let record = Record {
            id: generate_id(),
            created_at: now,
            updated_at: now,
            fields,
        };

        let mut items = self.load_raw()?;
        items.push(serde_json::to_value(&record)?);
        self.save(&items)?;

        tracing::debug!("Created {} in {}", record.id, E::COLLECTION);
        Ok(record)
    }

    /// Get a record by ID
    pub fn read(&self, id: &str) -> Option<Record<E>> {
        self.load().into_iter().find(|r| r.id == id)
    }

    /// All records in insertion order
    pub fn read_all(&self) -> Vec<Record<E>> {
        self.load()
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shallow-merge `patch` over the record with `id`
    ///
    /// Returns `Ok(None)` when no record has that id. Managed fields in the
    /// patch are ignored; unknown fields and values of the wrong shape are
    /// rejected with [`Error::Format`] and nothing is written.
    pub fn update(&self, id: &str, patch: &Fields) -> Result<Option<Record<E>>> {
        let Some((mut items, index, current)) = self.load_for_update(id)? else {
            return Ok(None);
        };

        let what = E::COLLECTION.to_string();
        let Value::Object(mut merged) = serde_json::to_value(&current)? else {
            return Err(Error::Other(format!("{what} record {id} is not an object")));
        };
        merge_known(&mut merged, patch, &MANAGED_FIELDS, &what)?;

        let mut updated: Record<E> = serde_json::from_value(Value::Object(merged))
            .map_err(|e| Error::Format(format!("invalid {what} update: {e}")))?;
        if E::TIMESTAMPED {
            updated.touch();
        }

        items[index] = serde_json::to_value(&updated)?;
        self.save(&items)?;

        tracing::debug!("Updated {} in {}", id, E::COLLECTION);
        Ok(Some(updated))
    }

    /// Typed form of [`update`](Self::update): edit the payload in place
    pub fn update_with(&self, id: &str, edit: impl FnOnce(&mut E)) -> Result<Option<Record<E>>> {
        let Some((mut items, index, mut record)) = self.load_for_update(id)? else {
            return Ok(None);
        };

        edit(&mut record.fields);
        if E::TIMESTAMPED {
            record.touch();
        }
        items[index] = serde_json::to_value(&record)?;
        self.save(&items)?;

        tracing::debug!("Updated {} in {}", id, E::COLLECTION);
        Ok(Some(record))
    }

    /// Remove a record. Returns whether anything was removed.
    ///
    /// Works on malformed records too, as long as they carry an `id`.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let items = self.load_raw()?;
        let before = items.len();
        let remaining: Vec<_> = items.into_iter().filter(|item| !has_id(item, id)).collect();

        if remaining.len() == before {
            return Ok(false);
        }

        self.save(&remaining)?;
        tracing::debug!("Deleted {} from {}", id, E::COLLECTION);
        Ok(true)
    }

    /// Records matching every non-blank criterion
    ///
    /// Text matches text case-insensitively by substring; anything else must
    /// be equal.
    pub fn search(&self, criteria: &Criteria) -> Vec<Record<E>> {
        self.load()
            .into_iter()
            .filter(|record| match serde_json::to_value(record) {
                Ok(value) => criteria.matches(&value),
                Err(_) => false,
            })
            .collect()
    }
}
