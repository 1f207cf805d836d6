use std::net::SocketAddr;
use std::sync::Arc;

use quill_core::comments::ARTICLE_STATUS_PUBLISHED;
use quill_db::models::article::CreateArticle;
use quill_db::{CommentService, CommentStore, MemoryCommentStore, PgCommentStore};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use quill_api::config::ServerConfig;
use quill_api::router::build_app_router;
use quill_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        max_depth = config.comments.max_depth,
        max_length = config.comments.max_length,
        require_approval = config.comments.require_approval,
        rate_limit_per_min = config.rate_limit_per_min,
        "Loaded configuration"
    );

    let store = open_store(&config).await;
    let service = CommentService::new(store, config.comments);
    let app = build_app_router(AppState::new(service, config.clone()), &config);

    let host = config
        .host
        .parse()
        .unwrap_or_else(|e| panic!("Invalid HOST '{}': {e}", config.host));
    let addr = SocketAddr::new(host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Cannot bind {addr}: {e}"));
    tracing::info!(%addr, "Comment server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server stopped with an error");
    }
    tracing::info!("Shut down");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quill_api=debug,quill_db=info,tower_http=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Postgres when `DATABASE_URL` is set (migrated on startup), otherwise an
/// in-memory store seeded with one open article.
async fn open_store(config: &ServerConfig) -> Arc<dyn CommentStore> {
    let Some(url) = &config.database_url else {
        let store = MemoryCommentStore::new();
        let article = store
            .insert_article(CreateArticle {
                title: "Welcome to Quill".into(),
                status: ARTICLE_STATUS_PUBLISHED.into(),
                allow_comments: true,
            })
            .await;
        tracing::warn!(
            article_id = article.id,
            "DATABASE_URL not set; comments live in memory only"
        );
        return Arc::new(store);
    };

    let pool = quill_db::create_pool(url)
        .await
        .unwrap_or_else(|e| panic!("Cannot connect to the database: {e}"));
    quill_db::health_check(&pool)
        .await
        .unwrap_or_else(|e| panic!("Database health check failed: {e}"));
    quill_db::run_migrations(&pool)
        .await
        .unwrap_or_else(|e| panic!("Migrations failed: {e}"));
    tracing::info!("Database ready");

    Arc::new(PgCommentStore::new(pool))
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, draining"),
        () = terminate => tracing::info!("SIGTERM received, draining"),
    }
}
