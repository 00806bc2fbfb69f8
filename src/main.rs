use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use catalog_api::config;
use catalog_api::database::DatabaseManager;
use catalog_api::handlers::{auth, products};
use catalog_api::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting catalog API in {:?} mode", config.environment);

    if let Err(e) = DatabaseManager::migrate().await {
        tracing::error!("Failed to apply database migrations: {}", e);
        std::process::exit(1);
    }

    let mut app = app();
    if config.server.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    let port = config.server.port;
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Catalog API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(product_routes())
        .layer(cors_layer())
}

fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
}

fn product_routes() -> Router {
    Router::new()
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/api/products/import", post(products::import_products))
        .route("/api/products/imports", get(products::list_imports))
        .route("/api/products/bulk-update", put(products::bulk_update))
        .route(
            "/api/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Catalog API",
        "version": version,
        "endpoints": {
            "health": "/health (public)",
            "auth": "/api/auth/register, /api/auth/login, /api/auth/forgot-password, /api/auth/reset-password (public)",
            "products": "/api/products[/:id] (bearer token required)",
            "import": "/api/products/import, /api/products/imports (bearer token required)",
            "bulk": "/api/products/bulk-update (bearer token required)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok",
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string(),
            })),
        ),
    }
}
