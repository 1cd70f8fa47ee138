use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use tourlite::cli::{self as prog_cli, Command};
use tourlite::{CatalogConfig, CatalogError, MemoryStore, TourCatalog};

const DEFAULT_DB: &str = "tourlite.json";

#[derive(Parser, Debug)]
#[command(name = "tourlite", version, about = "Tour catalog CLI", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the collection file (takes precedence over config/env)
    #[arg(long)]
    db: Option<PathBuf>,
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Import tours from a JSON array file through validation")]
    Seed { file: PathBuf },
    #[command(about = "List tours; QUERY is a URL query string, e.g. 'duration[gte]=5&sort=-price'")]
    List {
        #[arg(default_value = "")]
        query: String,
    },
    #[command(name = "top-cheap", about = "Top 5 best-rated, cheapest tours")]
    TopCheap {
        #[arg(default_value = "")]
        query: String,
    },
    #[command(about = "Show one tour by id")]
    Get { id: String },
    #[command(about = "Create a tour from inline JSON or @file")]
    Create { body: String },
    #[command(about = "Update a tour from inline JSON or @file")]
    Update { id: String, body: String },
    #[command(about = "Delete a tour by id")]
    Delete { id: String },
    #[command(about = "Statistics per difficulty over top-rated tours")]
    Stats,
    #[command(about = "Tour starts per month of YEAR")]
    Plan { year: String },
    #[command(about = "Print telemetry counters")]
    Metrics,
}

impl From<Commands> for Command {
    fn from(c: Commands) -> Self {
        match c {
            Commands::Seed { file } => Self::Seed { file },
            Commands::List { query } => Self::List { query },
            Commands::TopCheap { query } => Self::TopCheap { query },
            Commands::Get { id } => Self::Get { id },
            Commands::Create { body } => Self::Create { body },
            Commands::Update { id, body } => Self::Update { id, body },
            Commands::Delete { id } => Self::Delete { id },
            Commands::Stats => Self::Stats,
            Commands::Plan { year } => Self::Plan { year },
            Commands::Metrics => Self::Metrics,
        }
    }
}

fn init_logging(cfg: &CatalogConfig, verbose: u8) {
    if let Some(path) = &cfg.log_config {
        match tourlite::logger::init_path(path) {
            Ok(()) => return,
            Err(e) => eprintln!("warning: log config {} not loaded: {e}", path.display()),
        }
    }
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = tourlite::logger::init_console(level) {
        eprintln!("warning: logging disabled: {e}");
    }
}

fn open_store(db: &Path) -> Result<MemoryStore, CatalogError> {
    let store = MemoryStore::for_tours();
    if db.exists() {
        store.load_json(db)?;
    }
    Ok(store)
}

fn execute(cli: Cli) -> Result<(), CatalogError> {
    let mut cfg = CatalogConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        cfg.db_path = Some(db);
    }
    init_logging(&cfg, cli.verbose);
    let db = cfg.db_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DB));
    let catalog = TourCatalog::new(open_store(&db)?, cfg);

    let cmd = Command::from(cli.command);
    let write = cmd.is_write();
    prog_cli::run(&catalog, cmd, &mut std::io::stdout().lock())?;
    if write {
        catalog.store().dump_json(&db)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = execute(cli) {
        println!("{}", prog_cli::error_envelope(&e));
        std::process::exit(1);
    }
}
