use std::sync::Arc;

use axum::{http::HeaderValue, routing::get};
use axum_prometheus::PrometheusMetricLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wishlist_server::config::Config;
use wishlist_server::db::{self, PgStore};
use wishlist_server::fetch::FetchClient;
use wishlist_server::handlers;
use wishlist_server::state::AppState;

#[tokio::main]
async fn main() {
    // Loaded first so `.env` can set RUST_LOG and APP_ENV for the logger.
    let config = Config::from_env().expect("Failed to load configuration");

    // JSON logs in production, human-readable otherwise.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wishlist_server=info,tower_http=info,sqlx=warn"));

    if config.is_production {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🚀 Wishlist Server starting...");
    info!("📝 Configuration loaded");

    let fetcher = Arc::new(
        FetchClient::bot(config.fetch_timeout).expect("Failed to build HTTP fetch client"),
    );
    info!(timeout = ?config.fetch_timeout, "🌐 Fetch client ready");

    let app_state = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url)
                .await
                .expect("Failed to create database pool");

            db::health_check(&pool)
                .await
                .expect("Database health check failed");
            info!("✅ Database health check passed");

            AppState::with_postgres(PgStore::new(pool), fetcher, config.allow_private_hosts)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; wishlists are kept in memory only");
            AppState::in_memory(fetcher, config.allow_private_hosts)
        }
    };

    if config.allow_private_hosts {
        tracing::warn!("🔓 Item URLs may resolve to private or loopback addresses");
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid ALLOWED_ORIGINS entry");
                None
            }
        })
        .collect();
    info!("🔒 CORS origins: {}", config.allowed_origins.join(", "));

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = handlers::routes()
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .layer(prometheus_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = config.server_addr();
    info!("🎧 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
