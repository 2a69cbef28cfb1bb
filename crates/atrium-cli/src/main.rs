//! Atrium CLI - local-first internal portal data core

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use atrium_core::auth::{authenticate, PlaintextPolicy};
use atrium_core::config::Config;
use atrium_core::etl;
use atrium_core::mirror::{CloudSqlConfig, HttpMirror, SqlProvider};
use atrium_core::model::{record_id, Record, Table, UsedId};
use atrium_core::storage::{Database, DatabaseConfig, LocalStore};
use atrium_core::store::{AlterAction, MirrorStatus, Store};

#[derive(Parser)]
#[command(name = "atrium")]
#[command(author, version, about = "Local-first internal portal data core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage records in a collection (users, projects, gems, tools, used_ids)
    Records {
        /// Collection name
        table: String,
        #[command(subcommand)]
        action: RecordAction,
    },

    /// Allocate the next correlative project id
    NextId {
        /// Reserve the id in the ledger under this name
        #[arg(long)]
        reserve: Option<String>,
        /// Creator stamped on the reservation
        #[arg(long, default_value = "cli")]
        created_by: String,
    },

    /// Verify credentials against the local user collection
    Login {
        email: String,
        password: String,
    },

    /// Import a CSV file into a collection
    Import {
        /// Collection name
        table: String,
        /// CSV file path
        file: PathBuf,
        /// Field mappings as dest=csv_header pairs
        #[arg(short, long, required = true)]
        map: Vec<String>,
        /// Replace the whole collection instead of appending
        #[arg(long)]
        replace: bool,
        /// Parse and print without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Cloud mirror management
    Cloud {
        #[command(subcommand)]
        action: CloudAction,
    },

    /// Bulk schema changes over a collection
    Alter {
        /// Collection name
        table: String,
        #[command(subcommand)]
        action: AlterCmd,
    },

    /// Restore the seed dataset (keeps the used-id ledger)
    Reset {
        #[arg(long)]
        force: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum RecordAction {
    /// List all records
    List,
    /// Show one record
    Show { id: String },
    /// Add a record from inline JSON
    Add { json: String },
    /// Replace a record from inline JSON (matched by id)
    Update { json: String },
    /// Delete a record
    Delete { id: String },
}

#[derive(Subcommand)]
enum CloudAction {
    /// Show the stored mirror configuration
    Show,
    /// Store mirror connection settings
    Set {
        #[arg(long)]
        proxy_url: String,
        #[arg(long, default_value = "postgres")]
        provider: String,
        #[arg(long, default_value = "")]
        connection_name: String,
        #[arg(long, default_value = "")]
        db_name: String,
        #[arg(long, default_value = "")]
        db_user: String,
        #[arg(long)]
        active: bool,
    },
    /// Round-trip a trivial query through the proxy
    Test,
    /// Create the remote document tables
    InitSchema,
    /// Push every local record to the cloud
    Migrate,
    /// Read a collection back from the cloud
    Fetch { table: String },
}

#[derive(Subcommand)]
enum AlterCmd {
    /// Add a field to every record lacking it
    AddColumn {
        field: String,
        /// Default value as JSON (defaults to "")
        #[arg(long)]
        default: Option<String>,
    },
    /// Remove a field from every record
    DropColumn { field: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("atrium=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Records { table, action } => {
            let store = open_store(&config).await?;
            cmd_records(&store, &table, action, cli.format, cli.quiet).await
        }

        Commands::NextId {
            reserve,
            created_by,
        } => {
            let store = open_store(&config).await?;
            cmd_next_id(&store, reserve.as_deref(), &created_by, cli.quiet).await
        }

        Commands::Login { email, password } => {
            let store = open_store(&config).await?;
            cmd_login(&store, &email, &password, cli.quiet).await
        }

        Commands::Import {
            table,
            file,
            map,
            replace,
            dry_run,
        } => {
            let store = open_store(&config).await?;
            cmd_import(&store, &table, &file, &map, replace, dry_run, cli.quiet).await
        }

        Commands::Cloud { action } => {
            let store = open_store(&config).await?;
            cmd_cloud(&store, action, cli.format, cli.quiet).await
        }

        Commands::Alter { table, action } => {
            let store = open_store(&config).await?;
            cmd_alter(&store, &table, action, cli.quiet).await
        }

        Commands::Reset { force } => {
            let store = open_store(&config).await?;
            cmd_reset(&store, force, cli.quiet).await
        }

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor => cmd_doctor(&config, cli.quiet).await,
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    let db_config = match &config.database.path {
        Some(path) => DatabaseConfig::with_path(path).max_connections(config.database.max_connections),
        None => DatabaseConfig::default().max_connections(config.database.max_connections),
    };
    let db = Database::new(db_config)
        .await
        .context("Failed to open the local database")?;
    tracing::debug!(path = %db.path().display(), "Opened local database");
    let mirror = HttpMirror::new(config.mirror.timeout_secs)?;
    Ok(Store::open(LocalStore::new(db), Arc::new(mirror)).await?)
}

fn parse_table(name: &str) -> anyhow::Result<Table> {
    Table::parse(name).context("Expected one of: users, projects, gems, tools, used_ids")
}

fn parse_record(raw: &str) -> anyhow::Result<Record> {
    let record: Record = serde_json::from_str(raw).context("Record must be a JSON object")?;
    if record_id(&record).is_none() {
        return Err(anyhow::anyhow!("Record must carry a string \"id\" field"));
    }
    Ok(record)
}

fn report_mirror(status: &MirrorStatus, quiet: bool) {
    if quiet {
        return;
    }
    match status {
        MirrorStatus::Skipped => {}
        MirrorStatus::Synced => println!("Cloud mirror: synced"),
        MirrorStatus::Failed(reason) => println!("Cloud mirror: FAILED ({})", reason),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_records(
    store: &Store,
    table: &str,
    action: RecordAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let table = parse_table(table)?;

    match action {
        RecordAction::List => {
            let records = store.list(table).await;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                if records.is_empty() && !quiet {
                    println!("No records in {}.", table);
                }
                for record in &records {
                    let id = record_id(record).unwrap_or("(no id)");
                    let name = record
                        .get("name")
                        .and_then(|v| v.as_str())
                        .unwrap_or("");
                    println!("{}  {}", id, name);
                }
            }
        }

        RecordAction::Show { id } => {
            let records = store.list(table).await;
            match records.iter().find(|r| record_id(r) == Some(id.as_str())) {
                Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
                None => return Err(anyhow::anyhow!("No record with id {} in {}", id, table)),
            }
        }

        RecordAction::Add { json } => {
            let record = parse_record(&json)?;
            let id = record_id(&record).unwrap_or_default().to_string();
            let status = store.add(table, record).await?;
            if !quiet {
                println!("Added {} to {}.", id, table);
            }
            report_mirror(&status, quiet);
        }

        RecordAction::Update { json } => {
            let record = parse_record(&json)?;
            let id = record_id(&record).unwrap_or_default().to_string();
            let status = store.update(table, record).await?;
            if !quiet {
                println!("Updated {} in {}.", id, table);
            }
            report_mirror(&status, quiet);
        }

        RecordAction::Delete { id } => {
            let status = store.delete(table, &id).await?;
            if !quiet {
                println!("Deleted {} from {}.", id, table);
            }
            report_mirror(&status, quiet);
        }
    }

    Ok(())
}

async fn cmd_next_id(
    store: &Store,
    reserve: Option<&str>,
    created_by: &str,
    quiet: bool,
) -> anyhow::Result<()> {
    let id = store.next_project_id().await;
    println!("{}", id);

    if let Some(name) = reserve {
        let status = store
            .register_used_id(UsedId {
                id: id.clone(),
                name: name.to_string(),
                date_used: chrono::Utc::now().to_rfc3339(),
                created_by: created_by.to_string(),
            })
            .await?;
        if !quiet {
            println!("Reserved {} for '{}'.", id, name);
        }
        report_mirror(&status, quiet);
    }

    Ok(())
}

async fn cmd_login(store: &Store, email: &str, password: &str, quiet: bool) -> anyhow::Result<()> {
    let user = authenticate(store, &PlaintextPolicy, email, password).await?;
    if !quiet {
        println!("Welcome, {} ({:?}).", user.name, user.role);
    }
    Ok(())
}

async fn cmd_import(
    store: &Store,
    table: &str,
    file: &PathBuf,
    map: &[String],
    replace: bool,
    dry_run: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let table = parse_table(table)?;

    let mapping: Vec<(String, String)> = map
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(field, header)| (field.trim().to_string(), header.trim().to_string()))
                .ok_or_else(|| anyhow::anyhow!("Mapping must be dest=csv_header, got: {}", pair))
        })
        .collect::<anyhow::Result<_>>()?;

    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read CSV file: {}", file.display()))?;
    let parsed = etl::parse_csv(&text)?;
    let records = etl::transform(&parsed.rows, &mapping);

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let count = records.len();
    if replace {
        store.bulk_replace(table, records).await?;
    } else {
        for record in records {
            store.add(table, record).await?;
        }
    }
    if !quiet {
        println!("Imported {} records into {}.", count, table);
    }
    Ok(())
}

async fn cmd_cloud(
    store: &Store,
    action: CloudAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match action {
        CloudAction::Show => {
            let cloud = store.cloud_config().await;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&cloud)?);
            } else {
                println!("Proxy URL:  {}", if cloud.proxy_url.is_empty() { "(not set)" } else { &cloud.proxy_url });
                println!("Provider:   {:?}", cloud.provider);
                println!("Database:   {}", cloud.db_name);
                println!("Active:     {}", cloud.is_active);
            }
        }

        CloudAction::Set {
            proxy_url,
            provider,
            connection_name,
            db_name,
            db_user,
            active,
        } => {
            let provider = match provider.as_str() {
                "postgres" => SqlProvider::Postgres,
                "mysql" => SqlProvider::Mysql,
                other => return Err(anyhow::anyhow!("Unknown provider: {}. Expected postgres or mysql", other)),
            };
            store
                .save_cloud_config(CloudSqlConfig {
                    connection_name,
                    db_name,
                    db_user,
                    proxy_url,
                    provider,
                    is_active: active,
                })
                .await?;
            if !quiet {
                println!("Cloud configuration saved.");
            }
        }

        CloudAction::Test => {
            store.test_connection().await?;
            if !quiet {
                println!("Cloud connection OK.");
            }
        }

        CloudAction::InitSchema => {
            store.initialize_cloud_schema().await?;
            if !quiet {
                println!("Remote schema initialized.");
            }
        }

        CloudAction::Migrate => {
            let pushed = store.migrate_to_cloud().await?;
            if !quiet {
                println!("Pushed {} records to the cloud.", pushed);
            }
        }

        CloudAction::Fetch { table } => {
            let table = parse_table(&table)?;
            let records = store.fetch_remote(table).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

async fn cmd_alter(
    store: &Store,
    table: &str,
    action: AlterCmd,
    quiet: bool,
) -> anyhow::Result<()> {
    let table = parse_table(table)?;

    let status = match action {
        AlterCmd::AddColumn { field, default } => {
            let default = default
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .context("Default must be valid JSON")?;
            let status = store
                .alter_table(table, AlterAction::AddColumn, &field, default)
                .await?;
            if !quiet {
                println!("Added field '{}' to every record in {}.", field, table);
            }
            status
        }
        AlterCmd::DropColumn { field } => {
            let status = store
                .alter_table(table, AlterAction::DropColumn, &field, None)
                .await?;
            if !quiet {
                println!("Dropped field '{}' from every record in {}.", field, table);
            }
            status
        }
    };
    report_mirror(&status, quiet);
    Ok(())
}

async fn cmd_reset(store: &Store, force: bool, quiet: bool) -> anyhow::Result<()> {
    if !force {
        return Err(anyhow::anyhow!(
            "This replaces all local collections with the seed dataset. Re-run with --force to confirm."
        ));
    }
    store.reset_to_defaults().await?;
    if !quiet {
        println!("Local data restored to defaults. The used-id ledger was kept.");
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(config: &Config, quiet: bool) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let users = store.list(Table::Users).await.len();
    let projects = store.list(Table::Projects).await.len();
    let ledger = store.list(Table::UsedIds).await.len();
    let cloud = store.cloud_config().await;

    if !quiet {
        println!("Local database: OK");
        println!("  users: {}, projects: {}, ledger entries: {}", users, projects, ledger);
        println!(
            "Cloud mirror: {}",
            if cloud.is_enabled() { "active" } else { "inactive (local-only mode)" }
        );
    }

    if cloud.is_enabled() {
        match store.test_connection().await {
            Ok(()) => {
                if !quiet {
                    println!("Cloud connection: OK");
                }
            }
            Err(e) => println!("Cloud connection: FAILED ({})", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_accepts_known_names() {
        assert_eq!(parse_table("users").unwrap(), Table::Users);
        assert_eq!(parse_table("USED_IDS").unwrap(), Table::UsedIds);
        assert!(parse_table("invoices").is_err());
    }

    #[test]
    fn test_parse_record_requires_id() {
        assert!(parse_record(r#"{"id": "g1", "name": "x"}"#).is_ok());
        assert!(parse_record(r#"{"name": "no id"}"#).is_err());
        assert!(parse_record("[1, 2]").is_err());
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::parse_from(["atrium", "records", "gems", "list", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Commands::Records {
                action: RecordAction::List,
                ..
            }
        ));
    }
}
