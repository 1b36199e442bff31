use fyyur_db::AppState;
use fyyur_server::config::ServerConfig;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("invalid server configuration");

    // Database connection
    let db_config = fyyur_db::DatabaseConfig::from_env();
    tracing::info!("connecting to database...");
    let db = fyyur_db::connect(&db_config)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("running database migrations...");
    fyyur_migration::Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    tracing::info!("migrations complete");

    let state = Arc::new(AppState {
        db,
        clock: fyyur_db::system_clock(),
        secure_cookies: config.production,
    });

    let app = fyyur_server::app(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("failed to bind listen address");
    tracing::info!(addr = %config.bind, production = config.production, "server started");

    axum::serve(listener, app).await.expect("server error");
}
