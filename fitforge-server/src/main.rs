use fitforge_server::{
    config::Settings,
    db::Database,
    routes,
    state::{AppState, Services},
};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitforge_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new().expect("Failed to load settings");

    let db = Database::new(&settings.database.path).expect("Failed to create database");
    db.initialize().expect("Failed to initialize database schema");

    let seeded = db.seed_exercises().expect("Failed to seed exercise catalog");
    tracing::info!("Database initialized ({} demo exercises added)", seeded);

    let state = AppState::new(db, Services::from_settings(&settings));

    match state.session_manager.cleanup_expired_sessions() {
        Ok(count) => tracing::info!("Startup session cleanup removed {} sessions", count),
        Err(e) => tracing::error!("Failed to cleanup expired sessions on startup: {}", e),
    }

    // Hourly purge of expired sessions
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            if let Err(e) = cleanup_state.session_manager.cleanup_expired_sessions() {
                tracing::error!("Periodic session cleanup failed: {}", e);
            }
        }
    });

    let app = routes::router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .expect("Failed to parse server address");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}
