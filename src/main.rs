use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mental_health_platform::accounts::AccountService;
use mental_health_platform::admin::AnalyticsService;
use mental_health_platform::api;
use mental_health_platform::audit::AuditLogger;
use mental_health_platform::auth::SessionStore;
use mental_health_platform::config::AppConfig;
use mental_health_platform::database::{now, Database};
use mental_health_platform::state::AppState;

const SESSION_PURGE_INTERVAL_SECS: u64 = 3600;

#[derive(Parser)]
#[command(name = "mental-health-platform", version, about = "Mental health support service")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run migrations and serve the HTTP API (default)
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Store today's analytics snapshot and exit
    Snapshot,
    /// Create an administrator account
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "USA")]
        country: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mental_health_platform=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    info!("Configuration loaded");

    let database = Database::new(&config.database_url)
        .await
        .context("connecting to database")?;
    database.run_migrations().await.context("running migrations")?;
    info!("Database migrations completed");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, database).await,
        Command::Migrate => Ok(()),
        Command::Snapshot => {
            let snapshot = AnalyticsService::new(database.pool().clone())
                .snapshot(now().date_naive())
                .await?;
            info!("Snapshot stored for {}", snapshot.date);
            Ok(())
        }
        Command::CreateAdmin {
            username,
            email,
            password,
            country,
        } => {
            let state = AppState::new(config, database);
            let admin = AccountService::new(state.pool(), state.config.clone())
                .create_admin(&username, &email, &password, &country)
                .await?;
            info!("Admin account {} created", admin.id);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, database: Database) -> anyhow::Result<()> {
    let state = AppState::new(config, database);
    spawn_background_tasks(&state);

    let addr = state.config.bind_address();
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

fn spawn_background_tasks(state: &AppState) {
    let config = state.config.clone();

    if config.analytics.enabled {
        let analytics = AnalyticsService::new(state.pool());
        let period = Duration::from_secs(config.analytics.snapshot_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = analytics.snapshot(now().date_naive()).await {
                    error!("Failed to store analytics snapshot: {}", e);
                }
            }
        });
        info!("Analytics snapshot task started");
    }

    if config.audit.retention_days > 0 {
        let audit = AuditLogger::new(state.pool());
        let retention_days = config.audit.retention_days;
        let period = Duration::from_secs(config.audit.purge_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = audit.purge_older_than(retention_days).await {
                    error!("Failed to purge audit log: {}", e);
                }
            }
        });
        info!("Audit retention task started ({} days)", retention_days);
    }

    let sessions = SessionStore::new(state.pool(), config.auth.session_ttl_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_PURGE_INTERVAL_SECS));
        loop {
            interval.tick().await;
            if let Err(e) = sessions.purge_expired().await {
                error!("Failed to purge expired sessions: {}", e);
            }
        }
    });
}
