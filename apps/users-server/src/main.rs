use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use api_ingress::ApiIngress;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use users_info::UsersInfo;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Users API server - CRUD over a JSON-file user store
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users API server - CRUD over a JSON-file user store")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration and the data file
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Users API server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config).await,
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    let users = UsersInfo::init(&config)
        .await
        .context("failed to initialize users_info")?;
    let host = ApiIngress::from_app_config(&config)?;
    let router = host.build_router(users.register_rest(axum::Router::new()), UsersInfo::catalog());

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "cannot bind {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let addr = listener
        .local_addr()
        .context("listener has no local address")?;

    tracing::info!(
        %addr,
        environment = %config.server.mode,
        data_file = %users.data_file().display(),
        docs = %format!("http://{addr}/api/docs"),
        "server ready"
    );

    api_ingress::serve(listener, router, async {
        if let Err(e) = runtime::wait_for_shutdown().await {
            tracing::error!(error = %e, "signal handling failed; shutting down");
        }
    })
    .await
}

async fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    ApiIngress::from_app_config(&config)?;
    let status = UsersInfo::check(&config).await?;

    println!("Configuration check passed");
    println!("{status}");
    println!("{}", config.to_yaml()?);
    Ok(())
}
