//! HTTP server wiring for TreeGrid (API routes, handlers, and shared state).

/// HTTP error mapping for API handlers.
pub mod error;
/// Bounded server-side event history.
pub mod event_log;
/// HTTP handlers for records, views, schema, and events.
pub mod handlers;

pub use event_log::{EventLog, LoggedEvent};
pub use treegrid_core::{config, models, AppError, Config, Engine, Event, DEFAULT_PORT};

use crate::error::HttpError;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; connect-src 'self'; frame-ancestors 'none'; base-uri 'self'";

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<Engine>>,
    pub events: Arc<EventLog>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Construct shared application state around an engine.
    ///
    /// Registers an observer on `engine` that feeds the server's [`EventLog`].
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `engine`: Engine holding the initial records and schema.
    ///
    /// # Returns
    /// A new [`AppState`].
    pub fn new(config: Config, mut engine: Engine) -> Self {
        let events = Arc::new(EventLog::new(config.event_log_limit));
        let sink = Arc::clone(&events);
        engine.add_observer(move |event: &Event| sink.record(event));
        Self {
            engine: Arc::new(Mutex::new(engine)),
            events,
            config: Arc::new(config),
        }
    }

    /// Lock the engine for one request. Intents are applied in lock order.
    ///
    /// # Errors
    /// Returns a 500 [`HttpError`] if a previous holder panicked.
    pub fn engine(&self) -> Result<MutexGuard<'_, Engine>, HttpError> {
        self.engine
            .lock()
            .map_err(|_| HttpError::engine_unavailable())
    }
}

/// Create the application router with all routes and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
///
/// # Returns
/// Configured `axum::Router`.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let cors_port = state.config.port;
    create_app_with_cors_port(state, allow_public_access, cors_port)
}

/// Resolve the listener address from env var overrides and security policy.
///
/// # Arguments
/// - `config`: Server configuration containing the configured `port`.
/// - `allow_public_access`: Whether non-loopback bind targets are permitted.
///
/// # Returns
/// A validated socket address that enforces loopback when public access is disabled.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

fn cors_layer(allow_public_access: bool, cors_port: u16) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    if allow_public_access {
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any);
    }

    let origins: Vec<HeaderValue> = ["localhost", "127.0.0.1"]
        .iter()
        .filter_map(|host| HeaderValue::from_str(&format!("http://{}:{}", host, cors_port)).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

fn api_routes() -> Router<AppState> {
    use handlers::{events, records, schema, view};

    Router::new()
        .route(
            "/api/records",
            get(records::list_records).post(records::create_record),
        )
        .route(
            "/api/records/:id",
            get(records::get_record).delete(records::delete_record),
        )
        .route("/api/records/:id/field", put(records::update_field))
        .route("/api/records/:id/move", post(records::move_record))
        .route("/api/records/:id/drop", post(records::drop_record))
        .route("/api/tree", get(view::get_tree))
        .route("/api/rows", get(view::get_rows))
        .route("/api/expansion/expand-all", post(view::expand_all))
        .route("/api/expansion/collapse-all", post(view::collapse_all))
        .route("/api/expansion/:id/toggle", post(view::toggle_expansion))
        .route("/api/expansion/:id", put(view::set_expansion))
        .route(
            "/api/columns",
            get(schema::get_columns).put(schema::replace_columns),
        )
        .route(
            "/api/snapshot",
            get(schema::export_snapshot).post(schema::import_snapshot),
        )
        .route("/api/events", get(events::list_events))
        .route("/api/intents", post(events::apply_intent))
}

fn create_app_with_cors_port(state: AppState, allow_public_access: bool, cors_port: u16) -> Router {
    let max_request_size = state.config.max_request_size;

    api_routes().with_state(state).layer(
        tower::ServiceBuilder::new()
            .layer(DefaultBodyLimit::max(max_request_size))
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors_layer(allow_public_access, cors_port))
            .layer(SetResponseHeaderLayer::overriding(
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(CONTENT_SECURITY_POLICY),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            )),
    )
}

fn listener_cors_port(listener: &tokio::net::TcpListener, fallback_port: u16) -> u16 {
    listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(fallback_port)
}

/// Run the Axum server with graceful shutdown support.
///
/// # Arguments
/// - `listener`: Bound TCP listener for the server.
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
/// - `shutdown_signal`: Future that resolves when shutdown should start.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let cors_port = listener_cors_port(&listener, state.config.port);
    let app = create_app_with_cors_port(state, allow_public_access, cors_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
