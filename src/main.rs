use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tarmac::{create_router, init_pool, run_migrations, AppState, Config};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tarmac=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: DATABASE_URL (default: sqlite://tarmac.db)");
            eprintln!("Optional: LISTEN_ADDR (default: 0.0.0.0:3000)");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting Tarmac server");
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Database: {}", config.database_url);

    // Connect to database
    let pool = match init_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Database connection error: {}", e);
            std::process::exit(1);
        }
    };

    // Run migrations
    if let Err(e) = run_migrations(&pool).await {
        eprintln!("Migration error: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Database migrations completed");

    // Rebuild the in-memory schedule from the store
    let state = match AppState::load(pool).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to load flights: {}", e);
            std::process::exit(1);
        }
    };

    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
