//! dental - Dental practice records from the command line
//!
//! No server, no database - one JSON file per collection in the data directory.

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use dental_core::model::{
    Appointment, CalendarEvent, Dentist, Invoice, Patient, Prescription, Treatment,
};
use dental_core::{Collection, Config};
use std::path::PathBuf;

mod commands;

use commands::{Context, Severity, notify};

#[derive(Parser)]
#[command(name = "dental")]
#[command(about = "Dental practice records kept in a local data directory")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "DENTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory, overriding the config file
    #[arg(long, global = true, env = "DENTAL_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default dentist and practice settings if missing
    Init,

    /// Show storage availability and record counts
    Status,

    /// Create a record from a JSON object
    Create {
        /// Collection (patients, appointments, treatments, prescriptions,
        /// dentists, invoices, calendar-events)
        collection: Collection,

        /// Record fields as a JSON object
        #[arg(short, long)]
        data: Option<String>,

        /// Read the JSON object from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List records in a collection
    List {
        collection: Collection,

        /// Page number, starting at 1
        #[arg(short, long)]
        page: Option<usize>,
    },

    /// Show a record
    Show { collection: Collection, id: String },

    /// Update fields of a record
    Update {
        collection: Collection,
        id: String,

        /// FIELD=TEXT or FIELD:=JSON (repeatable)
        #[arg(short, long)]
        set: Vec<String>,

        /// Fields to replace as a JSON object
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Delete a record
    Delete { collection: Collection, id: String },

    /// Find records matching every FIELD=TEXT or FIELD:=JSON criterion
    Search {
        collection: Collection,
        criteria: Vec<String>,
    },

    /// Filter patients by name, phone or email
    Patients {
        term: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long)]
        page: Option<usize>,
    },

    /// Practice overview
    Dashboard,

    /// Export every collection and the settings to a JSON file
    Export {
        /// Output file (defaults to <prefix>-<date>.json in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the document to stdout instead
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Replace collections with the contents of an export file
    Import { path: PathBuf },

    /// Remove all records and settings
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or change practice settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show all settings
    Show,
    /// Get a value by dotted key (e.g. billingSettings.taxRate)
    Get { key: String },
    /// Set an existing value by dotted key
    Set { key: String, value: String },
    /// Overwrite the stored settings with the defaults
    Reset,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print the config file path
    Path,
    /// Reset configuration to defaults
    Reset,
}

/// Run a generic command with the entity type behind `collection`
macro_rules! for_collection {
    ($collection:expr, $func:ident ( $($arg:expr),* )) => {
        match $collection {
            Collection::Patients => commands::$func::<Patient>($($arg),*),
            Collection::Appointments => commands::$func::<Appointment>($($arg),*),
            Collection::Treatments => commands::$func::<Treatment>($($arg),*),
            Collection::Prescriptions => commands::$func::<Prescription>($($arg),*),
            Collection::Dentists => commands::$func::<Dentist>($($arg),*),
            Collection::Invoices => commands::$func::<Invoice>($($arg),*),
            Collection::CalendarEvents => commands::$func::<CalendarEvent>($($arg),*),
        }
    };
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `init` seeds itself so it can report what it created
fn seeds_on_open(command: &Commands) -> bool {
    !matches!(command, Commands::Init)
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path().ok_or_else(|| anyhow!("No config directory found"))?,
    };

    // Config commands must work even when the data directory is broken
    if let Commands::Config { command } = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config_show(&config_path, cli.json),
            Some(ConfigCommands::Path) => commands::config_path(&config_path),
            Some(ConfigCommands::Reset) => commands::config_reset(&config_path),
        };
    }

    let config = Config::load(&config_path)?;
    if !config.display.colors {
        colored::control::set_override(false);
    }
    let ctx = Context::open(config, cli.data_dir, cli.json, seeds_on_open(&cli.command))?;

    match cli.command {
        Commands::Init => commands::init(&ctx),
        Commands::Status => commands::status(&ctx),
        Commands::Create {
            collection,
            data,
            file,
        } => for_collection!(collection, create(&ctx, data, file)),
        Commands::List { collection, page } => for_collection!(collection, list(&ctx, page)),
        Commands::Show { collection, id } => for_collection!(collection, show(&ctx, &id)),
        Commands::Update {
            collection,
            id,
            set,
            data,
        } => for_collection!(collection, update(&ctx, &id, &set, data)),
        Commands::Delete { collection, id } => for_collection!(collection, delete(&ctx, &id)),
        Commands::Search {
            collection,
            criteria,
        } => for_collection!(collection, search(&ctx, &criteria)),
        Commands::Patients { term, page } => commands::patients(&ctx, term, page),
        Commands::Dashboard => commands::dashboard(&ctx),
        Commands::Export { output, stdout } => commands::export(&ctx, output, stdout),
        Commands::Import { path } => commands::import(&ctx, &path),
        Commands::Clear { yes } => commands::clear(&ctx, yes),
        Commands::Settings { command } => match command {
            Some(SettingsCommands::Show) | None => commands::settings_show(&ctx),
            Some(SettingsCommands::Get { key }) => commands::settings_get(&ctx, &key),
            Some(SettingsCommands::Set { key, value }) => {
                commands::settings_set(&ctx, &key, &value)
            }
            Some(SettingsCommands::Reset) => commands::settings_reset(&ctx),
        },
        Commands::Config { .. } => Ok(()),
    }
}

fn main() {
    init_tracing();

    if let Err(e) = run(Cli::parse()) {
        notify(Severity::Error, format!("{e:#}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_collection_argument() {
        let cli = Cli::try_parse_from(["dental", "list", "calendar-events", "--page", "2"]).unwrap();
        match cli.command {
            Commands::List { collection, page } => {
                assert_eq!(collection, Collection::CalendarEvents);
                assert_eq!(page, Some(2));
            }
            _ => panic!("expected list"),
        }

        assert!(Cli::try_parse_from(["dental", "list", "wizards"]).is_err());
    }

    #[test]
    fn test_only_init_skips_seeding_on_open() {
        let init = Cli::try_parse_from(["dental", "init"]).unwrap();
        assert!(!seeds_on_open(&init.command));

        let status = Cli::try_parse_from(["dental", "status"]).unwrap();
        assert!(seeds_on_open(&status.command));
    }

    #[test]
    fn test_parse_update_assignments() {
        let cli = Cli::try_parse_from([
            "dental", "update", "patient", "p1", "--set", "phone=555", "--set", "gender=\"male\"",
        ])
        .unwrap();
        match cli.command {
            Commands::Update { id, set, .. } => {
                assert_eq!(id, "p1");
                assert_eq!(set.len(), 2);
            }
            _ => panic!("expected update"),
        }
    }
}
