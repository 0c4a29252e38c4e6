//! Stored record envelope and field bags
//!
//! Every entity payload is persisted inside a [`Record`]: the store-assigned
//! `id`, the store-managed `createdAt`/`updatedAt` pair, then the payload's
//! own camelCase fields, all at the same level of one JSON object.

use crate::{Collection, Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name to value mapping used for partial updates and search
pub type Fields = serde_json::Map<String, Value>;

/// Fields the store owns; callers cannot set them through a patch
pub const MANAGED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// A record shape that can live in a collection
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// Collection records of this shape are persisted in
    const COLLECTION: Collection;

    /// Whether the store stamps `createdAt`/`updatedAt`
    const TIMESTAMPED: bool = true;

    /// One-line description for listings
    fn summary(&self) -> String;
}

/// A persisted entity
///
/// The two timestamps are independent: a record imported with only
/// `createdAt` keeps it, and gains `updatedAt` on its next update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<E> {
    /// Store-assigned identifier, never reassigned
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub fields: E,
}

impl<E> Record<E> {
    pub fn into_fields(self) -> E {
        self.fields
    }

    /// Set `updated_at` to now, always moving it forward
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = Some(match self.updated_at {
            Some(previous) if previous >= now => previous + chrono::Duration::nanoseconds(1),
            _ => now,
        });
    }
}

impl<E> std::ops::Deref for Record<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.fields
    }
}

impl<E> std::ops::DerefMut for Record<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.fields
    }
}

/// Shallow-merge `patch` into `target`
///
/// Keys listed in `skip` are ignored. Every other key must already exist in
/// `target`; its value replaces the old one wholesale.
pub(crate) fn merge_known(
    target: &mut Fields,
    patch: &Fields,
    skip: &[&str],
    what: &str,
) -> Result<()> {
    for (key, value) in patch {
        if skip.contains(&key.as_str()) {
            continue;
        }
        match target.get_mut(key) {
            Some(slot) => *slot = value.clone(),
            None => return Err(Error::Format(format!("unknown field '{key}' for {what}"))),
        }
    }
    Ok(())
}

/// Build a payload from its defaults overlaid with `fields`
///
/// Managed fields are ignored and unknown fields rejected, as in
/// [`crate::RecordStore::update`].
pub fn payload_from_fields<E: Entity + Default>(fields: &Fields) -> Result<E> {
    let what = E::COLLECTION.to_string();
    let Value::Object(mut merged) = serde_json::to_value(E::default())? else {
        return Err(Error::Other(format!("{what} payload is not an object")));
    };
    merge_known(&mut merged, fields, &MANAGED_FIELDS, &what)?;
    serde_json::from_value(Value::Object(merged))
        .map_err(|e| Error::Format(format!("invalid {what}: {e}")))
}

/// Partial field bag matched against records by [`crate::RecordStore::search`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    fields: Fields,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint on `field`
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// True when no criterion constrains anything
    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    fn active(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter().filter(|(_, value)| !is_blank(value))
    }

    /// Check a serialized record against every non-blank criterion
    pub fn matches(&self, record: &Value) -> bool {
        self.active().all(|(key, wanted)| match record.get(key) {
            Some(actual) => value_matches(actual, wanted),
            None => false,
        })
    }
}

impl From<Fields> for Criteria {
    fn from(fields: Fields) -> Self {
        Self { fields }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn value_matches(actual: &Value, wanted: &Value) -> bool {
    match (actual, wanted) {
        (Value::String(actual), Value::String(wanted)) => {
            actual.to_lowercase().contains(&wanted.to_lowercase())
        }
        (Value::Number(actual), Value::Number(wanted)) => actual.as_f64() == wanted.as_f64(),
        _ => actual == wanted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Note {
        title: String,
        page_count: u32,
        tag: Option<String>,
    }

    #[test]
    fn test_record_json_layout() {
        let now = Utc::now();
        let record = Record {
            id: "abc".into(),
            created_at: Some(now),
            updated_at: Some(now),
            fields: Note {
                title: "Molar".into(),
                page_count: 2,
                tag: None,
            },
        };

        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        for key in ["id", "createdAt", "updatedAt", "title", "pageCount", "tag"] {
            assert!(object.contains_key(key), "missing {key}");
        }

        let back: Record<Note> = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_without_stamps() {
        let value = json!({"id": "x1", "title": "Block", "pageCount": 1, "tag": "red"});
        let record: Record<Note> = serde_json::from_value(value).unwrap();
        assert!(record.created_at.is_none());
        assert!(record.updated_at.is_none());
        assert_eq!(record.title, "Block");

        let out = serde_json::to_value(&record).unwrap();
        assert!(out.get("createdAt").is_none());
    }

    #[test]
    fn test_record_with_only_created_at() {
        let value = json!({
            "id": "x2", "createdAt": "2024-01-01T00:00:00.000Z",
            "title": "Crown", "pageCount": 3, "tag": null
        });
        let mut record: Record<Note> = serde_json::from_value(value).unwrap();
        let created = record.created_at.unwrap();
        assert_eq!(created.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert!(record.updated_at.is_none());

        let out = serde_json::to_value(&record).unwrap();
        assert!(out.get("createdAt").is_some());
        assert!(out.get("updatedAt").is_none());

        record.touch();
        assert!(record.updated_at.unwrap() > created);
        assert_eq!(record.created_at, Some(created));
    }

    #[test]
    fn test_touch_moves_forward() {
        let future = Utc::now() + chrono::Duration::hours(1);
        let mut record = Record {
            id: "t".into(),
            created_at: Some(future),
            updated_at: Some(future),
            fields: Note {
                title: "Clock skew".into(),
                page_count: 0,
                tag: None,
            },
        };
        record.touch();
        assert!(record.updated_at.unwrap() > future);
        assert_eq!(record.created_at, Some(future));
    }

    #[test]
    fn test_merge_known() {
        let mut target = json!({"a": 1, "b": 2}).as_object().unwrap().clone();
        let patch = json!({"a": 9, "id": "nope"}).as_object().unwrap().clone();
        merge_known(&mut target, &patch, &MANAGED_FIELDS, "test").unwrap();
        assert_eq!(Value::Object(target.clone()), json!({"a": 9, "b": 2}));

        let bad = json!({"c": 3}).as_object().unwrap().clone();
        assert!(matches!(
            merge_known(&mut target, &bad, &MANAGED_FIELDS, "test"),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_payload_from_fields() {
        use crate::model::{Gender, Patient};

        let fields = json!({"firstName": "Jane", "gender": "female", "id": "ignored"});
        let patient: Patient = payload_from_fields(fields.as_object().unwrap()).unwrap();
        assert_eq!(patient.first_name, "Jane");
        assert_eq!(patient.gender, Gender::Female);
        assert_eq!(patient.last_name, "");

        let bad = json!({"firstName": 7});
        assert!(matches!(
            payload_from_fields::<Patient>(bad.as_object().unwrap()),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_criteria_matching() {
        let jane = json!({"name": "Jane Doe", "duration": 60, "active": true});

        assert!(Criteria::new().with("name", "doe").matches(&jane));
        assert!(Criteria::new().with("name", "").matches(&jane));
        assert!(Criteria::new().with("name", Value::Null).matches(&jane));
        assert!(!Criteria::new().with("name", "roe").matches(&jane));
        assert!(Criteria::new().with("duration", 60.0).matches(&jane));
        assert!(!Criteria::new().with("duration", "60").matches(&jane));
        assert!(Criteria::new().with("active", true).matches(&jane));
        assert!(!Criteria::new().with("missing", "x").matches(&jane));
    }

    #[test]
    fn test_criteria_is_empty() {
        assert!(Criteria::new().is_empty());
        assert!(Criteria::new().with("name", "").is_empty());
        assert!(!Criteria::new().with("name", "a").is_empty());
    }
}
