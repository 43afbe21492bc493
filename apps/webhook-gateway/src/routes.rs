// [apps/webhook-gateway/src/routes.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY ROUTING MATRIX (V5.0 - PUSH INGRESS)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE RED DEL WEBHOOK GATEWAY
 * =================================================================
 */

use crate::handlers::webhook::PushEventHandler;
use crate::state::GatewayState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn create_gateway_router(gateway_state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .route("/webhooks/events", post(PushEventHandler::handle_push_event))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway_state)
}
