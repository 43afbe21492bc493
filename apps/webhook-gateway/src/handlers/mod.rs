// [apps/webhook-gateway/src/handlers/mod.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY HANDLERS BARREL (V5.0)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * =================================================================
 */

/// Recepción y validación de notificaciones push del Forge.
pub mod webhook;
