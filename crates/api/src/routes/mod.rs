//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (document store ping)
//!
//! # Products (public)
//! GET    /api/products                - Product listing
//! GET    /api/products/{id}           - Product detail
//! GET    /api/products/type/{type}    - Products of one type
//!
//! # Cart (bearer)
//! GET    /api/carts                   - Cart lines with live totals
//! POST   /api/carts                   - Add a product (merges by product)
//! DELETE /api/carts                   - Clear the cart
//! PUT    /api/carts/{itemId}          - Replace a line's quantity
//! DELETE /api/carts/{itemId}          - Remove a line
//!
//! # Checkout (bearer, multipart on POST/PUT)
//! GET    /api/checkout                - Caller's checkouts
//! POST   /api/checkout                - Place a checkout
//! GET    /api/checkout/all            - All checkouts
//! GET    /api/checkout/{checkoutId}   - One checkout
//! PUT    /api/checkout/{checkoutId}   - Update a checkout (owner)
//! DELETE /api/checkout/{checkoutId}   - Delete a checkout (owner)
//!
//! # Farms (public)
//! GET    /api/farmers                 - Farm listing
//! GET    /api/farmers/{id}            - Farm detail
//!
//! # History (public)
//! GET    /api/history                 - Checkout history projection
//! ```

pub mod cart;
pub mod checkout;
pub mod farms;
pub mod history;
pub mod products;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    routing::{get, put},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Room for multipart boundaries and text fields on top of the file cap.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/type/{kind}", get(products::by_type))
}

/// Create the farm routes router.
pub fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(farms::index))
        .route("/{id}", get(farms::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route("/{item_id}", put(cart::update).delete(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::index).post(checkout::create))
        .route("/all", get(checkout::all))
        .route(
            "/{checkout_id}",
            get(checkout::show)
                .put(checkout::update)
                .delete(checkout::destroy),
        )
}

/// Create all `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/farmers", farm_routes())
        .nest("/carts", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/history", get(history::index))
}

/// Build the full application router.
///
/// Sentry layers are not added here; the binary wraps the returned router
/// so that tests can drive it without a Sentry hub.
pub fn app(state: AppState) -> Router {
    let body_limit = state
        .config()
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the document store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, backend = state.store().backend(), "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
