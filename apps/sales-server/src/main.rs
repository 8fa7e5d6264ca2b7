use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use docstore::{DocumentStore, MemoryStore, MemoryStoreOptions};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, StoreConfig};
use sales::config::SalesConfig;
use sales::infra::storage::synthetic;
use sales::SalesModule;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Sales Explorer Server - paginated sales transaction queries over HTTP
#[derive(Parser)]
#[command(name = "sales-server")]
#[command(about = "Sales Explorer Server - paginated sales transaction queries over HTTP")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Serve a generated dataset instead of loading one from disk
    #[arg(long)]
    mock: bool,

    /// Dataset file to load (overrides config)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
        dataset: cli.dataset.as_ref().map(|p| p.to_string_lossy().to_string()),
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / dataset / verbosity)
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Sales Explorer Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
    }
}

/// Where the collection comes from for this run.
enum StoreSource {
    Mock { records: u64, seed: u64 },
    File(PathBuf),
}

fn store_source(store_cfg: &StoreConfig, base_dir: &Path, mock: bool) -> Result<StoreSource> {
    if mock {
        return Ok(StoreSource::Mock {
            records: store_cfg.mock_records,
            seed: store_cfg.mock_seed,
        });
    }
    let path = store_cfg.dataset_path(base_dir).ok_or_else(|| {
        anyhow!("No dataset configured: set store.dataset, pass --dataset, or use --mock")
    })?;
    if !path.is_file() {
        return Err(anyhow!("Dataset file not found: {}", path.display()));
    }
    Ok(StoreSource::File(path))
}

fn open_store(store_cfg: &StoreConfig, source: StoreSource) -> Result<Arc<dyn DocumentStore>> {
    let options = MemoryStoreOptions {
        sort_memory_limit: store_cfg.sort_memory_limit,
        ..Default::default()
    };
    let store = match source {
        StoreSource::Mock { records, seed } => {
            tracing::info!(records, seed, "Using generated dataset");
            synthetic::memory_store(&store_cfg.collection, records, seed, options)
        }
        StoreSource::File(path) => {
            MemoryStore::open(&store_cfg.collection, &path, store_cfg.format, options)
                .with_context(|| format!("Failed to load dataset {}", path.display()))?
        }
    };
    Ok(Arc::new(store))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let base_dir = PathBuf::from(&config.server.home_dir);
    let store_cfg = config.store.clone().unwrap_or_default();
    let sales_cfg: SalesConfig = config.module_config("sales")?;
    let ingress_cfg: ApiIngressConfig = config.module_config("api_ingress")?;

    let source = store_source(&store_cfg, &base_dir, args.mock)?;
    let store = open_store(&store_cfg, source)?;

    let module = SalesModule::new();
    module.init(&sales_cfg, store)?;
    module.warm_up().await?;

    let bind_addr = ingress_cfg.resolve_bind_addr(&config.server.host, config.server.port);
    ApiIngress::new(ingress_cfg)
        .with_identity("sales-server", env!("CARGO_PKG_VERSION"))
        .mount(&module)?
        .serve(&bind_addr, shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let base_dir = PathBuf::from(&config.server.home_dir);
    let store_cfg = config.store.clone().unwrap_or_default();
    config.module_config::<SalesConfig>("sales")?;
    let ingress_cfg: ApiIngressConfig = config.module_config("api_ingress")?;

    let bind_addr = ingress_cfg.resolve_bind_addr(&config.server.host, config.server.port);
    bind_addr
        .parse::<std::net::SocketAddr>()
        .with_context(|| format!("Invalid bind address '{bind_addr}'"))?;

    match store_source(&store_cfg, &base_dir, args.mock)? {
        StoreSource::Mock { records, .. } => println!("Store: generated dataset ({records} records)"),
        StoreSource::File(path) => println!("Store: {}", path.display()),
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}
