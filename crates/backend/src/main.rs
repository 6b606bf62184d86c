pub mod api;
pub mod domain;
pub mod shared;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::http::{header, Method};
    use axum::{
        routing::{get, post, put},
        Router,
    };
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    use api::handlers;

    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("backend.log"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                // keep SQL statement logging quiet, application logs stay on
                "info,sqlx=warn,sea_orm=warn".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    let config = shared::config::load_config()?;

    shared::data::db::initialize_database()
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-actor"),
        ]);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // USER TYPE ROUTES
        // ========================================
        .route(
            "/api/user_type",
            get(handlers::a101_user_type::list_all).post(handlers::a101_user_type::upsert),
        )
        .route(
            "/api/user_type/:id",
            get(handlers::a101_user_type::get_by_id).delete(handlers::a101_user_type::delete),
        )
        .route(
            "/api/user_type/:id/fields",
            get(handlers::a101_user_type::list_fields).post(handlers::a101_user_type::create_field),
        )
        .route(
            "/api/user_type/:id/fields/reorder",
            put(handlers::a101_user_type::reorder_fields),
        )
        .route(
            "/api/user_type/:id/fields/:field_id",
            put(handlers::a101_user_type::update_field)
                .delete(handlers::a101_user_type::delete_field),
        )
        .route(
            "/api/user_type/:id/fields/:field_id/status",
            put(handlers::a101_user_type::toggle_field_status),
        )
        .route(
            "/api/user_type/:id/fields/:field_id/duplicate",
            post(handlers::a101_user_type::duplicate_field),
        )
        // ========================================
        // USER ROUTES
        // ========================================
        .route(
            "/api/user",
            get(handlers::a102_user::list_all).post(handlers::a102_user::upsert),
        )
        .route(
            "/api/user/:id",
            get(handlers::a102_user::get_by_id).delete(handlers::a102_user::delete),
        )
        .route(
            "/api/user/:id/fields",
            get(handlers::a102_user::list_fields).post(handlers::a102_user::create_field),
        )
        .route(
            "/api/user/:id/fields/effective",
            get(handlers::a102_user::effective_fields),
        )
        .route(
            "/api/user/:id/fields/override",
            post(handlers::a102_user::override_field),
        )
        .route(
            "/api/user/:id/fields/reorder",
            put(handlers::a102_user::reorder_fields),
        )
        .route(
            "/api/user/:id/fields/:field_id",
            put(handlers::a102_user::update_field).delete(handlers::a102_user::delete_field),
        )
        .route(
            "/api/user/:id/fields/:field_id/status",
            put(handlers::a102_user::toggle_field_status),
        )
        .route(
            "/api/user/:id/fields/:field_id/duplicate",
            post(handlers::a102_user::duplicate_field),
        )
        .route(
            "/api/user/:id/values",
            get(handlers::a102_user::get_field_values).put(handlers::a102_user::save_field_values),
        )
        .layer(cors);

    let addr: SocketAddr = config.server.listen.parse()?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: {} is already in use. Please ensure no other process is using this address.",
                    addr
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
