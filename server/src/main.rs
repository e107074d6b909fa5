use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use intake_server::config::Config;
use intake_server::routes::create_routes;
use intake_server::services::notifier::EmailNotifier;
use intake_server::services::store::{PgRegistrantStore, SheetRegistrantStore};
use intake_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let notifier = EmailNotifier::new(config.email.clone()).expect("Failed to build email client");
    tracing::info!(
        enabled = notifier.is_enabled(),
        recipients = config.email.admin_recipients.len(),
        "Admin notifications configured"
    );

    let sheet_path = config.sheet.path();
    tracing::info!(path = %sheet_path.display(), "Sheet store configured");

    let state = AppState::new(
        Arc::new(PgRegistrantStore::new(pool)),
        Arc::new(SheetRegistrantStore::new(sheet_path)),
        Arc::new(notifier),
        config.email.chat_link.as_str(),
    );

    let app: Router = create_routes(state);

    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
