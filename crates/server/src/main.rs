mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use remate_core::Config;
use remate_store::{AuctionStore, ChatStore, JsonFileStore, SqliteStore};

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let store: Arc<dyn AuctionStore> = if config.backend.use_local_fallback {
        tracing::warn!(
            path = %config.backend.local_fallback_path,
            "serving auctions from the local JSON fallback; not durable"
        );
        Arc::new(JsonFileStore::new(&config.backend.local_fallback_path))
    } else {
        Arc::new(SqliteStore::open(&config.backend.database_path)?)
    };
    let chat = ChatStore::open(&config.backend.database_path)?;

    let bind_addr = config.server.bind_addr.clone();
    let state = Arc::new(AppState {
        config,
        store,
        chat,
    });

    let app = Router::new()
        .route(
            "/auctions",
            get(routes::auctions::list)
                .post(routes::auctions::upload)
                .delete(routes::auctions::delete),
        )
        .route("/prices/comparison", get(routes::prices::comparison))
        .route("/prices/trend", get(routes::prices::trend))
        .route("/prices/detail", get(routes::prices::detail))
        .route("/stats", get(routes::prices::stats))
        .route(
            "/streams",
            get(routes::streams::list)
                .post(routes::streams::create)
                .delete(routes::streams::deactivate),
        )
        .route(
            "/streams/{id}/comments",
            get(routes::streams::comments).post(routes::streams::post_comment),
        )
        .route(
            "/streams/{id}/comments/live",
            get(routes::streams::live_comments),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("listening on http://{bind_addr}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
