mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use audit::{AuditStore, DecisionRecord, FanoutSink, MemorySink, StoreSink};
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use driver::MaliciousDriver;
use gateway::{Gateway, ResourceTable};
use policy::{Mode, PolicyStore, Verdict, Whitelist};

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "warden.toml";

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Capability gateway for untrusted ICS driver components", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the driver simulation under the configured security mode
    Run {
        /// Security mode (overrides warden.toml)
        #[arg(short, long)]
        mode: Option<String>,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recorded runs
    Runs {
        /// Show only the last N runs
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Show the decision log for a run
    Log {
        /// Run ID (prefix match supported)
        #[arg(short, long)]
        run: String,
        /// Filter by verdict (allow, deny)
        #[arg(short, long)]
        verdict: Option<String>,
    },
    /// List the security modes and their policy templates
    Modes,
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WARDEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Run {
        mode: None,
        json: false,
    });

    match command {
        Commands::Run { mode, json } => cmd_run(mode.as_deref(), json),
        Commands::Runs { limit } => cmd_runs(limit),
        Commands::Log { run, verdict } => cmd_log(&run, verdict.as_deref()),
        Commands::Modes => cmd_modes(),
    }
}

fn cmd_run(mode_flag: Option<&str>, json: bool) -> Result<()> {
    let config = load_config()?;
    let mode = match mode_flag {
        Some(name) => name.parse::<Mode>()?,
        None => config.mode,
    };
    let whitelist = config.whitelist()?;
    let target = config.driver_target()?;

    let store = PolicyStore::new(whitelist.clone());
    store.apply(mode);

    // Persist the trail under the platform data dir, keep a copy in memory
    // for display.
    let data_dir = dirs_data_dir().unwrap_or_else(|| ".warden".into());
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("audit.db");
    let audit_store = AuditStore::open(&db_path)?;

    let memory = Arc::new(MemorySink::new());
    let sink = FanoutSink::new(vec![memory.clone(), Arc::new(StoreSink::new(audit_store))]);

    let gateway = Gateway::new(store, ResourceTable::builtin(), Arc::new(sink));
    let report = MaliciousDriver::new(target).run(&gateway);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("warden v{}", env!("CARGO_PKG_VERSION"));
    println!("Mode: {mode}");
    if !whitelist.is_empty() {
        let entries: Vec<String> = whitelist.iter().map(|e| e.to_string()).collect();
        println!("Whitelist: {}", entries.join(", "));
    }
    println!("Audit trail: {}", db_path.display());
    println!();

    for phase in &report.phases {
        let marker = if phase.allowed { "ALLOW" } else { "DENY " };
        println!("[{marker}] {}: {}", phase.name, phase.detail);
    }
    println!();
    if report.breached {
        println!("RESULT: BREACH - telemetry left the perimeter");
    } else {
        println!("RESULT: contained - no data exfiltrated");
    }

    println!("\nDecisions:");
    for record in memory.records() {
        print_record(&record);
    }
    println!("\nRun ID: {}", report.run_id);

    Ok(())
}

fn cmd_runs(limit: usize) -> Result<()> {
    let store = open_store()?;
    let runs = store.list_runs()?;

    if runs.is_empty() {
        println!("No runs found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<20}  {:<10}  DENIALS",
        "RUN ID", "STARTED", "DECISIONS"
    );
    println!("{}", "-".repeat(80));

    for summary in runs.into_iter().take(limit) {
        let started = Local
            .from_utc_datetime(&summary.started_at.naive_utc())
            .format("%Y-%m-%d %H:%M");
        println!(
            "{:<36}  {:<20}  {:<10}  {}",
            summary.id, started, summary.decisions, summary.denials
        );
    }

    Ok(())
}

fn cmd_log(run_prefix: &str, verdict_filter: Option<&str>) -> Result<()> {
    let store = open_store()?;

    // Find the run by prefix.
    let runs = store.list_runs()?;
    let matching: Vec<_> = runs
        .iter()
        .filter(|s| s.id.to_string().starts_with(run_prefix))
        .collect();

    let run_id = match matching.len() {
        0 => {
            return Err(Error::RunNotFound {
                prefix: run_prefix.to_string(),
            });
        }
        1 => matching[0].id,
        _ => {
            return Err(Error::AmbiguousRun {
                prefix: run_prefix.to_string(),
                matches: matching.iter().map(|s| s.id.to_string()).collect(),
            });
        }
    };

    let verdict = verdict_filter.map(parse_verdict).transpose()?;
    let records = store.load_run(run_id, verdict)?;

    if records.is_empty() {
        println!("No decisions found for run {run_id}");
        return Ok(());
    }

    println!("Run: {run_id}\n");
    for record in records {
        print_record(&record);
    }

    Ok(())
}

fn cmd_modes() -> Result<()> {
    println!(
        "{:<16}  {:<12}  {:<12}  WHITELIST-ONLY",
        "MODE", "FILESYSTEM", "NETWORK"
    );
    println!("{}", "-".repeat(60));

    for mode in Mode::ALL {
        let config = mode.config(Whitelist::new());
        let flag = |allowed| if allowed { "allow" } else { "deny" };
        println!(
            "{:<16}  {:<12}  {:<12}  {}",
            mode.as_str(),
            flag(config.filesystem_allowed),
            flag(config.network_allowed),
            if config.restricted_network_allowed {
                "yes"
            } else {
                "no"
            }
        );
    }

    Ok(())
}

fn print_record(record: &DecisionRecord) {
    let time = Local
        .from_utc_datetime(&record.timestamp.naive_utc())
        .format("%H:%M:%S");
    let verdict = match record.verdict {
        Verdict::Allow => "ALLOW",
        Verdict::Deny => "DENY ",
    };
    println!(
        "[{time}] {verdict} {} ({})",
        record.request,
        record.reason.as_str()
    );
}

fn parse_verdict(s: &str) -> Result<Verdict> {
    match s {
        "allow" => Ok(Verdict::Allow),
        "deny" => Ok(Verdict::Deny),
        other => Err(Error::InvalidVerdict(other.to_string())),
    }
}

fn open_store() -> Result<AuditStore> {
    let data_dir = dirs_data_dir().unwrap_or_else(|| ".warden".into());
    let db_path = data_dir.join("audit.db");

    if !db_path.exists() {
        return Err(Error::DatabaseNotFound { path: db_path });
    }

    Ok(AuditStore::open(&db_path)?)
}

fn dirs_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share/warden"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
            .map(|p| p.join("warden"))
    }
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|h| PathBuf::from(h).join("warden"))
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

fn load_config() -> Result<Config> {
    let config_path = PathBuf::from(CONFIG_FILE);

    if config_path.exists() {
        Ok(Config::load(&config_path)?)
    } else {
        Ok(Config::default())
    }
}
