use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use ecclesiaflow_backend::{
    AppState,
    agents::{ContentGenerator, GeminiGenerator, TemplateGenerator},
    config::Config,
    database::{Database, MemoryDatabase, PgDatabase},
    router::create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn connect_database(config: &Config) -> Arc<dyn Database> {
    match &config.database_url {
        Some(url) => {
            let db = PgDatabase::connect(config, url)
                .await
                .expect("Failed to connect to Postgres");
            db.ensure_schema().await.expect("Failed to prepare schema");
            tracing::info!("Using Postgres database");
            Arc::new(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            Arc::new(MemoryDatabase::new())
        }
    }
}

fn content_generator(config: &Config) -> Arc<dyn ContentGenerator> {
    match &config.gemini_api_key {
        Some(key) => {
            let generator =
                GeminiGenerator::new(config, key.clone()).expect("Failed to build HTTP client");
            tracing::info!(model = %config.gemini_model, "Content generation via Gemini");
            Arc::new(generator)
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, content falls back to templates");
            Arc::new(TemplateGenerator)
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    let database = connect_database(&config).await;
    let generator = content_generator(&config);
    let state = AppState::new(config.clone(), database, generator);

    let app = create_router(state);

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
