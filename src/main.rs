use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use banter_workout::config::Config;
use banter_workout::handlers::workouts::WorkoutsState;
use banter_workout::repositories::{SessionRepository, WorkoutRepository};
use banter_workout::version::GIT_VERSION;
use banter_workout::{db, migrations, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banter_workout=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!(version = GIT_VERSION, "Connecting to database: {}", config.database_url);

    let pool = db::create_pool(&config.database_url, config.pool_size)?;
    migrations::run_migrations(&pool)?;

    let session_repo = SessionRepository::new(pool.clone());
    let removed = session_repo.cleanup_expired().await?;
    if removed > 0 {
        tracing::info!("Removed {} expired sessions", removed);
    }

    let workouts_state = WorkoutsState {
        workout_repo: WorkoutRepository::new(pool.clone()),
        session_repo,
    };

    let app = routes::create_router(workouts_state);

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
