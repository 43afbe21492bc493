// [apps/event-log/src/routes.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN ROUTING MATRIX (V8.0 - EVENT FABRIC)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE RED DEL EVENT LOG
 *
 * # Logic:
 * Topología de puerta única:
 * 1. POST /events          — ingesta (commit-sync, status change, migración).
 * 2. GET  /events          — enumeración por proyecto.
 * 3. POST /subscriptions   — protocolo de alta y renovación.
 * 4. DELETE /projects/:id  — purga en cascada.
 * 5. GET  /status, /health — ventana operacional y liveness.
 * =================================================================
 */

use crate::handlers::{
    diagnostics::DiagnosticsHandler, events::EventIngestionHandler,
    projects::ProjectAdministrationHandler, subscriptions::SubscriptionHandler,
};
use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_sovereign_router(application_shared_state: AppState) -> Router {
    // Escudo de Red: CORS para el dashboard de operaciones.
    let network_security_shield = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .route(
            "/events",
            post(EventIngestionHandler::handle_event_ingestion)
                .get(EventIngestionHandler::handle_event_enumeration),
        )
        .route("/subscriptions", post(SubscriptionHandler::handle_subscription))
        .route(
            "/projects/:project_id",
            delete(ProjectAdministrationHandler::handle_project_purge),
        )
        .route("/status", get(DiagnosticsHandler::handle_status_window))
        .layer(TraceLayer::new_for_http())
        .layer(network_security_shield)
        .with_state(application_shared_state)
}
