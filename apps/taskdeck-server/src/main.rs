use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Router};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use serde::Deserialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;
use uuid::Uuid;

use assistant::config::AssistantConfig;
use assistant::domain::engine::SuggestionEngine;
use assistant::infra::OpenAiCompletionClient;
use serverkit::auth::{
    HttpIdentityProvider, IdentityProvider, SessionContext, StaticIdentityProvider,
};
use tasks::config::TasksConfig;
use tasks::contract::client::TasksApi;
use tasks::domain::service::{Service as TasksService, ServiceConfig as TasksServiceConfig};
use tasks::domain::watch::TaskFeed;
use tasks::gateways::local::TasksLocalClient;
use tasks::infra::storage::{migrations::Migrator, SeaOrmTasksRepository};

/// External auth collaborator settings, read from the module config bag.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct AuthSettings {
    #[serde(default = "default_auth_base_url")]
    base_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            base_url: default_auth_base_url(),
        }
    }
}

fn default_auth_base_url() -> String {
    "http://127.0.0.1:9099".to_string()
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Taskdeck Server - personal task scheduling with live sync and AI focus suggestions
#[derive(Parser)]
#[command(name = "taskdeck-server")]
#[command(about = "Taskdeck Server - personal task scheduling service")]
#[command(version = "0.1.0")]
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

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database and a static dev identity
    #[arg(long)]
    mock: bool,

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
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Taskdeck Server starting");

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config).await,
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let base_dir = PathBuf::from(&config.server.home_dir);

    // --- database ---
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("Database configuration required"))?;

    let config_dsn = db_config.url.trim().to_owned();
    if config_dsn.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let mut final_dsn = if args.mock {
        "sqlite::memory:".to_string()
    } else {
        config_dsn
    };

    // Absolutize sqlite DSNs to avoid cwd issues
    if final_dsn.starts_with("sqlite://") {
        final_dsn = absolutize_sqlite_dsn(&final_dsn, &base_dir, true)?;
    }

    tracing::info!("Connecting to database: {}", final_dsn);
    // In-memory SQLite is per-connection; pool wider than 1 would split the schema.
    let max_conns = if final_dsn == "sqlite::memory:" {
        1
    } else {
        db_config.max_conns.unwrap_or(10)
    };
    let mut connect_opts = ConnectOptions::new(final_dsn);
    connect_opts
        .max_connections(max_conns)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    let conn = Database::connect(connect_opts)
        .await
        .context("database connection failed")?;

    tracing::info!("Running task database migrations");
    Migrator::up(&conn, None)
        .await
        .context("database migration failed")?;

    // --- tasks module ---
    let tasks_cfg: TasksConfig = config.module_config("tasks")?;
    let repo = Arc::new(SeaOrmTasksRepository::new(conn.clone()));
    let feed = Arc::new(TaskFeed::new(tasks_cfg.channel_capacity, repo.clone()));
    let tasks_service = Arc::new(TasksService::new(
        repo,
        feed.clone(),
        TasksServiceConfig {
            max_title_length: tasks_cfg.max_title_length,
        },
    ));
    let tasks_api: Arc<dyn TasksApi> = Arc::new(TasksLocalClient::new(tasks_service.clone()));

    // --- assistant module ---
    let assistant_cfg: AssistantConfig = config.module_config("assistant")?;
    let api_key = std::env::var(&assistant_cfg.api_key_env).unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!(
            "{} is not set; suggestions will use the local fallback",
            assistant_cfg.api_key_env
        );
    }
    let completion = Arc::new(OpenAiCompletionClient::new(&assistant_cfg, api_key)?);
    let engine = Arc::new(SuggestionEngine::new(completion));

    // --- identity ---
    let identity: Arc<dyn IdentityProvider> = if args.mock {
        tracing::warn!("Mock mode: accepting the static 'dev-token' bearer token");
        Arc::new(StaticIdentityProvider::new().with_token(
            "dev-token",
            SessionContext {
                user_id: Uuid::nil(),
                email: "dev@taskdeck.local".to_string(),
                display_name: Some("Dev User".to_string()),
                photo_url: None,
            },
        ))
    } else {
        let auth_cfg: AuthSettings = config.module_config("auth")?;
        let base = Url::parse(&auth_cfg.base_url)
            .with_context(|| format!("invalid auth base_url '{}'", auth_cfg.base_url))?;
        Arc::new(HttpIdentityProvider::new(reqwest::Client::new(), base))
    };

    // --- router ---
    let api = Router::new()
        .merge(tasks::api::rest::routes::router(tasks_service, feed))
        .merge(assistant::api::rest::routes::router(engine, tasks_api));

    let mut app = Router::new()
        .nest("/api", api)
        .layer(Extension(identity))
        .layer(TraceLayer::new_for_http());

    if config.server.timeout_sec > 0 {
        app = app.layer(TimeoutLayer::new(Duration::from_secs(
            config.server.timeout_sec,
        )));
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Taskdeck Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

async fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // AppConfig::load_* already normalized & created home_dir
    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
