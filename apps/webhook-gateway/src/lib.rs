// [apps/webhook-gateway/src/lib.rs]
/*!
 * =================================================================
 * APARATO: WEBHOOK GATEWAY LIBRARY ROOT (V5.0 - PUSH INGRESS)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN DEL ÁRBOL DE MÓDULOS DEL GATEWAY
 * =================================================================
 */

/// Adaptadores de entrada para las notificaciones push del Forge.
pub mod handlers;
/// Topología de red del gateway.
pub mod routes;
/// Relevo asíncrono hacia el Event Log.
pub mod services;
/// Estado compartido (bóveda de tokens + túnel al Event Log).
pub mod state;

pub mod prelude {
    pub use crate::routes::create_gateway_router;
    pub use crate::state::GatewayState;
}
