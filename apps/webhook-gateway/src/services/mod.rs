// [apps/webhook-gateway/src/services/mod.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY SERVICES BARREL (V5.0)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * =================================================================
 */

/// Relevo asíncrono de solicitudes de sincronización al Event Log.
pub mod commit_sync_relay;

pub use commit_sync_relay::CommitSyncRelayService;
