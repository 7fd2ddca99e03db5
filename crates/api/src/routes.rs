use crate::handlers;
use crate::payment::{self, ENTRYPOINT_ID};
use crate::state::AppState;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assembles the full application router.
///
/// The computation endpoints sit behind the payment gate; discovery
/// documents, the landing page and health stay open so agents can find and
/// probe the service before paying.
pub fn build_router(state: AppState) -> Router {
    let entrypoint_path = format!("/entrypoints/{ENTRYPOINT_ID}/invoke");

    let gated = Router::new()
        .route("/lp/estimate", post(handlers::estimate))
        .route("/lp/calculate", post(handlers::calculate))
        .route(&entrypoint_path, post(handlers::entrypoint_invoke))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            payment::payment_gate,
        ));

    Router::new()
        .route("/", get(handlers::landing))
        .route("/health", get(handlers::health))
        .route("/.well-known/x402", get(handlers::x402_metadata))
        .route("/.well-known/agent.json", get(handlers::agent_metadata))
        .route(&entrypoint_path, get(handlers::entrypoint_manifest))
        .merge(gated)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
