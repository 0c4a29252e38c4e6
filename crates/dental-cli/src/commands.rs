//! CLI command implementations

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use dental_core::model::Patient;
use dental_core::seed::default_settings;
use dental_core::{
    Clinic, Config, Criteria, Entity, Fields, FileStorage, Record, Storage, export_file_name,
    payload_from_fields,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::settings::Style;

/// How loud a notice is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Print a user-facing notice
pub fn notify(severity: Severity, message: impl std::fmt::Display) {
    match severity {
        Severity::Success => println!("{} {}", "✓".green(), message),
        Severity::Info => println!("{} {}", "i".blue(), message),
        Severity::Warning => eprintln!("{} {}", "!".yellow(), message),
        Severity::Error => eprintln!("{} {}", "✗".red(), message),
    }
}

/// Opened clinic plus everything commands need to print
pub struct Context {
    pub clinic: Clinic<FileStorage>,
    pub config: Config,
    pub json: bool,
}

impl Context {
    /// Open the data directory; `seed` creates missing defaults when the
    /// config allows it
    pub fn open(config: Config, data_dir: Option<PathBuf>, json: bool, seed: bool) -> Result<Self> {
        let dir = match data_dir {
            Some(dir) => dir,
            None => config.resolve_data_dir()?,
        };
        tracing::debug!(dir = %dir.display(), "opening data directory");
        let storage = FileStorage::open(&dir)
            .with_context(|| format!("Failed to open data directory {}", dir.display()))?;

        let clinic = Clinic::new(storage);
        if seed && config.seed_defaults {
            if let Err(e) = clinic.seed_defaults() {
                notify(Severity::Warning, format!("Could not seed defaults: {e}"));
            }
        }

        Ok(Self {
            clinic,
            config,
            json,
        })
    }

    fn format_time(&self, time: Option<chrono::DateTime<chrono::Utc>>) -> String {
        time.map(|t| t.format(&self.config.display.date_format).to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    fn truncate(&self, text: &str) -> String {
        let max = self.config.display.max_summary_length;
        if text.chars().count() <= max {
            return text.to_string();
        }
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }

    fn page<T>(&self, items: Vec<T>, page: Option<usize>) -> Vec<T> {
        let Some(page) = page else {
            return items;
        };
        let size = self.config.display.page_size.max(1);
        items
            .into_iter()
            .skip(page.saturating_sub(1) * size)
            .take(size)
            .collect()
    }
}

/// Parse `field=text` (string value) or `field:=json` (any JSON value)
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let Some(eq) = raw.find('=') else {
        bail!("Expected FIELD=VALUE or FIELD:=JSON, got '{}'", raw);
    };
    let (key, value) = if eq > 0 && raw.as_bytes()[eq - 1] == b':' {
        let json = &raw[eq + 1..];
        let value = serde_json::from_str(json)
            .with_context(|| format!("Invalid JSON value for {}: {}", &raw[..eq - 1], json))?;
        (&raw[..eq - 1], value)
    } else {
        (&raw[..eq], Value::String(raw[eq + 1..].to_string()))
    };

    if key.is_empty() {
        bail!("Missing field name in '{}'", raw);
    }
    Ok((key.to_string(), value))
}

fn parse_assignments(raw: &[String]) -> Result<Fields> {
    let mut fields = Fields::new();
    for item in raw {
        let (key, value) = parse_assignment(item)?;
        fields.insert(key, value);
    }
    Ok(fields)
}

fn parse_object(text: &str) -> Result<Fields> {
    match serde_json::from_str(text).context("Invalid JSON")? {
        Value::Object(fields) => Ok(fields),
        _ => bail!("Expected a JSON object"),
    }
}

fn print_records<E: Entity>(ctx: &Context, records: &[Record<E>]) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string(records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No records found");
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Summary", "Updated"]);
    for record in records {
        builder.push_record([
            record.id.clone(),
            ctx.truncate(&record.summary()),
            ctx.format_time(record.updated_at),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
    println!("{} {}", records.len(), E::COLLECTION);
    Ok(())
}

fn print_record<E: Entity>(ctx: &Context, record: &Record<E>) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("{} {}", record.id.cyan().bold(), record.summary().bold());
    println!();
    if E::TIMESTAMPED {
        println!("Created:  {}", ctx.format_time(record.created_at));
        println!("Updated:  {}", ctx.format_time(record.updated_at));
        println!();
    }
    println!("{}", serde_json::to_string_pretty(&record.fields)?);
    Ok(())
}

/// Seed defaults and report what was created
pub fn init(ctx: &Context) -> Result<()> {
    let report = ctx.clinic.seed_defaults()?;

    if ctx.json {
        println!("{}", serde_json::to_string(&report)?);
    } else if report.is_empty() {
        notify(Severity::Info, "Nothing to seed");
    } else {
        if let Some(id) = &report.dentist_id {
            notify(Severity::Success, format!("Created default dentist {id}"));
        }
        if report.settings {
            notify(Severity::Success, "Saved default practice settings");
        }
    }
    notify(
        Severity::Info,
        format!("Data directory: {}", ctx.clinic.storage().dir().display()),
    );
    Ok(())
}

/// Storage availability and record counts
pub fn status(ctx: &Context) -> Result<()> {
    let available = ctx.clinic.storage().is_available();
    let counts = ctx.clinic.counts();
    let has_settings = ctx.clinic.settings().get().is_some();

    if ctx.json {
        let counts: serde_json::Map<String, Value> = counts
            .iter()
            .map(|(c, n)| (c.to_string(), Value::from(*n)))
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "dataDir": ctx.clinic.storage().dir(),
                "available": available,
                "settings": has_settings,
                "counts": counts,
            })
        );
        return Ok(());
    }

    println!("Data directory: {}", ctx.clinic.storage().dir().display());
    if available {
        notify(Severity::Success, "Storage is writable");
    } else {
        notify(Severity::Warning, "Storage is not writable");
    }
    if !has_settings {
        notify(Severity::Warning, "No practice settings; run 'dental init'");
    }
    println!();
    for (collection, count) in counts {
        println!("  {:<16} {}", collection.to_string(), count);
    }
    Ok(())
}

pub fn create<E: Entity + Default>(
    ctx: &Context,
    data: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let text = match (data, file) {
        (Some(data), None) => data,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => bail!("Provide the record with --data or --file"),
        (Some(_), Some(_)) => bail!("Use either --data or --file, not both"),
    };

    let fields: E = payload_from_fields(&parse_object(&text)?)?;
    let record = ctx.clinic.records::<E>().create(fields)?;

    if ctx.json {
        println!("{}", serde_json::to_string(&record)?);
    } else {
        notify(
            Severity::Success,
            format!("Created {} in {}", record.id.cyan(), E::COLLECTION),
        );
        println!("  {}", record.summary());
    }
    Ok(())
}

pub fn list<E: Entity>(ctx: &Context, page: Option<usize>) -> Result<()> {
    let records = ctx.page(ctx.clinic.records::<E>().read_all(), page);
    print_records(ctx, &records)
}

pub fn show<E: Entity>(ctx: &Context, id: &str) -> Result<()> {
    let record = ctx
        .clinic
        .records::<E>()
        .read(id)
        .ok_or_else(|| anyhow::anyhow!("No {} record with id {}", E::COLLECTION, id))?;
    print_record(ctx, &record)
}

pub fn update<E: Entity>(
    ctx: &Context,
    id: &str,
    set: &[String],
    data: Option<String>,
) -> Result<()> {
    let mut patch = match data {
        Some(text) => parse_object(&text)?,
        None => Fields::new(),
    };
    patch.extend(parse_assignments(set)?);
    if patch.is_empty() {
        bail!("Nothing to update; pass --set FIELD=VALUE or --data");
    }

    let record = ctx
        .clinic
        .records::<E>()
        .update(id, &patch)?
        .ok_or_else(|| anyhow::anyhow!("No {} record with id {}", E::COLLECTION, id))?;

    if ctx.json {
        println!("{}", serde_json::to_string(&record)?);
    } else {
        notify(Severity::Success, format!("Updated {}", id));
    }
    Ok(())
}

pub fn delete<E: Entity>(ctx: &Context, id: &str) -> Result<()> {
    let removed = ctx.clinic.records::<E>().delete(id)?;

    if ctx.json {
        println!("{}", serde_json::json!({ "deleted": removed }));
    } else if removed {
        notify(Severity::Success, format!("Deleted {}", id));
    } else {
        notify(
            Severity::Warning,
            format!("No {} record with id {}", E::COLLECTION, id),
        );
    }
    Ok(())
}

pub fn search<E: Entity>(ctx: &Context, criteria: &[String]) -> Result<()> {
    let criteria = Criteria::from(parse_assignments(criteria)?);
    let records = ctx.clinic.records::<E>().search(&criteria);
    print_records(ctx, &records)
}

/// Quick filter over patients by name, phone or email
pub fn patients(ctx: &Context, term: Option<String>, page: Option<usize>) -> Result<()> {
    let term = term.unwrap_or_default();
    let today = chrono::Local::now().date_naive();
    let matched: Vec<Record<Patient>> = ctx
        .clinic
        .patients()
        .read_all()
        .into_iter()
        .filter(|p| p.matches_term(&term))
        .collect();
    let total = matched.len();
    let shown = ctx.page(matched, page);

    if ctx.json {
        println!("{}", serde_json::to_string(&shown)?);
        return Ok(());
    }
    if shown.is_empty() {
        println!("No patients found");
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Age", "Phone", "Email"]);
    for patient in &shown {
        builder.push_record([
            patient.id.clone(),
            patient.full_name(),
            patient
                .age_on(today)
                .map(|age| age.to_string())
                .unwrap_or_else(|| "-".to_string()),
            patient.phone.clone(),
            patient.email.clone(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
    println!("{} of {} patients", shown.len(), total);
    Ok(())
}

pub fn dashboard(ctx: &Context) -> Result<()> {
    let stats = ctx.clinic.dashboard(chrono::Local::now().date_naive());

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Dashboard".bold());
    println!();
    println!("Patients:             {}", stats.total_patients);
    println!("Today's appointments: {}", stats.today_appointments);
    println!("Pending treatments:   {}", stats.pending_treatments);
    println!("Pending invoices:     {}", stats.pending_invoices);

    println!();
    println!("{}", "Recent patients:".bold());
    if stats.recent_patients.is_empty() {
        println!("  (none)");
    }
    for patient in &stats.recent_patients {
        println!("  {} {}", patient.id.cyan(), patient.full_name());
    }

    println!();
    println!("{}", "Upcoming appointments:".bold());
    if stats.upcoming_appointments.is_empty() {
        println!("  (none)");
    }
    for appointment in &stats.upcoming_appointments {
        println!("  {} {}", appointment.id.cyan(), appointment.summary());
    }
    Ok(())
}

pub fn export(ctx: &Context, output: Option<PathBuf>, stdout: bool) -> Result<()> {
    let document = ctx.clinic.export_all()?;
    if stdout {
        println!("{document}");
        return Ok(());
    }

    let path = match output {
        Some(path) => path,
        None => {
            let dir = ctx
                .config
                .export
                .directory
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));
            let today = chrono::Local::now().date_naive();
            dir.join(export_file_name(&ctx.config.export.file_prefix, today))
        }
    };
    std::fs::write(&path, document)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if ctx.json {
        println!("{}", serde_json::json!({ "path": path }));
    } else {
        notify(Severity::Success, format!("Exported to {}", path.display()));
    }
    Ok(())
}

pub fn import(ctx: &Context, path: &Path) -> Result<()> {
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let summary = ctx.clinic.import(&document)?;

    if ctx.json {
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    for (collection, count) in &summary.collections {
        println!("  {:<16} {}", collection.to_string(), count);
    }
    if summary.settings {
        println!("  settings replaced");
    }
    for key in &summary.ignored {
        notify(Severity::Warning, format!("Ignored unknown key {key}"));
    }
    notify(
        Severity::Success,
        format!("Imported {} collections", summary.collections.len()),
    );
    Ok(())
}

/// Remove every collection and the settings
pub fn clear(ctx: &Context, yes: bool) -> Result<()> {
    if !yes {
        println!(
            "{}",
            "This will remove all patients, appointments, treatments, invoices and settings."
                .red()
        );
        println!("Export first if you want a backup: dental export");
        println!();
        print!("Continue? [y/N] ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted");
            return Ok(());
        }
    }

    ctx.clinic.clear_all()?;
    notify(Severity::Success, "Cleared all data");
    Ok(())
}

fn settings_value(ctx: &Context) -> Result<Value> {
    let settings = ctx
        .clinic
        .settings()
        .get()
        .ok_or_else(|| anyhow::anyhow!("No practice settings; run 'dental init'"))?;
    Ok(serde_json::to_value(settings)?)
}

/// Show practice settings
pub fn settings_show(ctx: &Context) -> Result<()> {
    let value = settings_value(ctx)?;
    if ctx.json {
        println!("{}", serde_json::to_string(&value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

/// Get a settings value by dotted key (e.g. "billingSettings.taxRate")
pub fn settings_get(ctx: &Context, key: &str) -> Result<()> {
    let settings = settings_value(ctx)?;
    let mut value = &settings;
    for part in key.split('.') {
        value = value
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Settings key not found: {}", key))?;
    }

    if ctx.json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        match value {
            Value::String(s) => println!("{}", s),
            Value::Bool(b) => println!("{}", b),
            Value::Number(n) => println!("{}", n),
            Value::Null => println!("null"),
            _ => println!("{}", serde_json::to_string_pretty(value)?),
        }
    }
    Ok(())
}

/// Interpret `raw` as text where the current value is text, else as JSON
fn coerce_like(current: &Value, raw: &str) -> Result<Value> {
    match current {
        Value::String(_) => Ok(Value::String(raw.to_string())),
        _ => serde_json::from_str(raw).with_context(|| format!("Invalid value: {}", raw)),
    }
}

/// Replace the existing value at `path` inside `section`
fn assign_existing(section: &mut Value, path: &[&str], raw: &str) -> Result<()> {
    let mut slot = section;
    for part in path {
        slot = slot
            .get_mut(*part)
            .ok_or_else(|| anyhow::anyhow!("Settings key not found: {}", part))?;
    }
    *slot = coerce_like(slot, raw)?;
    Ok(())
}

/// Set an existing settings value by dotted key
pub fn settings_set(ctx: &Context, key: &str, raw: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let section = parts[0];
    let mut value = settings_value(ctx)?
        .get(section)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Settings key not found: {}", key))?;
    assign_existing(&mut value, &parts[1..], raw)
        .with_context(|| format!("Cannot set {}", key))?;

    let mut patch = Fields::new();
    patch.insert(section.to_string(), value);
    ctx.clinic
        .settings()
        .update(&patch)?
        .ok_or_else(|| anyhow::anyhow!("No practice settings; run 'dental init'"))?;

    notify(Severity::Success, format!("Set {} = {}", key, raw));
    Ok(())
}

/// Overwrite the practice settings with the defaults
///
/// Unlike `SettingsStore::reset`, which removes the stored settings, this
/// leaves a complete settings object behind.
pub fn settings_reset(ctx: &Context) -> Result<()> {
    ctx.clinic.settings().save(&default_settings())?;
    notify(Severity::Success, "Practice settings reset to defaults");
    Ok(())
}

/// Show current configuration
pub fn config_show(path: &Path, json: bool) -> Result<()> {
    let config = Config::load(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", "Current configuration:".bold());
        println!();
        print!("{}", toml::to_string_pretty(&config)?);
    }
    Ok(())
}

pub fn config_path(path: &Path) -> Result<()> {
    println!("{}", path.display());
    Ok(())
}

/// Reset configuration to defaults
pub fn config_reset(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default_with_comments())?;
    notify(Severity::Success, "Configuration reset to defaults");
    Ok(())
}
