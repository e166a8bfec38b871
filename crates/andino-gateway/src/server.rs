// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use andino_core::AndinoError;
use andino_service::Services;
use axum::middleware as axum_middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub services: Services,
}

/// Assemble the full route tree.
///
/// `/health` and registration are public; everything else requires a bearer
/// token resolved by the auth middleware.
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/users", post(handlers::users::register))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/packages", get(handlers::packages::list))
        .route("/v1/packages", post(handlers::packages::create))
        .route("/v1/packages/{id}", get(handlers::packages::get))
        .route("/v1/packages/{id}", patch(handlers::packages::update))
        .route("/v1/cart", get(handlers::cart::view))
        .route("/v1/cart/items", post(handlers::cart::add_item))
        .route("/v1/cart/items", delete(handlers::cart::clear))
        .route("/v1/cart/items/{id}", delete(handlers::cart::remove_item))
        .route("/v1/sales", post(handlers::sales::checkout))
        .route("/v1/sales", get(handlers::sales::list))
        .route("/v1/sales/{id}", get(handlers::sales::get))
        .route("/v1/sales/{id}/confirm", post(handlers::sales::confirm))
        .route("/v1/sales/{id}/cancel", post(handlers::sales::cancel))
        .route(
            "/v1/sales/{id}/lines/{line_id}",
            patch(handlers::sales::update_line),
        )
        .route(
            "/v1/sales/{id}/lines/{line_id}",
            delete(handlers::sales::remove_line),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until ctrl-c.
pub async fn start_server(host: &str, port: u16, state: GatewayState) -> Result<(), AndinoError> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AndinoError::Internal(format!("failed to bind to {addr}: {e}")))?;

    tracing::info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AndinoError::Internal(format!("server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
