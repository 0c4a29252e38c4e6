//! dental-core: Core library for the dental practice record store
//!
//! Typed records for patients, appointments, treatments and the rest, kept
//! in a flat key-value store: one key per collection, one JSON array per key.

pub mod clinic;
pub mod collection;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod id;
pub mod model;
pub mod record;
pub mod seed;
pub mod settings;
pub mod storage;
pub mod store;

pub use clinic::Clinic;
pub use collection::Collection;
pub use config::Config;
pub use dashboard::DashboardStats;
pub use dataset::{ImportSummary, clear_all_data, export_all_data, export_file_name, import_data};
pub use error::Error;
pub use id::generate_id;
pub use record::{Criteria, Entity, Fields, Record, payload_from_fields};
pub use seed::{SeedReport, seed_defaults};
pub use settings::{Settings, SettingsStore};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::RecordStore;

/// Result type for dental operations
pub type Result<T> = std::result::Result<T, Error>;
