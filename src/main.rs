//! EventHub
//!
//! Main application entry point

use tracing::info;

use eventhub::{
    config::Settings,
    database::{connection, DatabaseService},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes buffered log lines on shutdown
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting EventHub {}...", eventhub::VERSION);

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = connection::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        ..connection::DatabaseConfig::default()
    };
    let pool = connection::create_pool(&db_config).await?;

    // Run database migrations
    connection::run_migrations(&pool).await?;

    // Initialize services
    let database_service = DatabaseService::new(pool);
    let services = ServiceFactory::new(database_service, &settings);

    // Ensure the core roles exist and every account holds one
    info!("Bootstrapping roles...");
    services.access.bootstrap_roles().await?;

    info!("EventHub is ready");
    Ok(())
}
