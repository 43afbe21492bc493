// [libs/infra/event-log-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: EVENT LOG CLIENT SDK ROOT (V7.0 - EVENT FABRIC)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL SDK DE SUSCRIPTORES
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod project_lock;
pub mod renewal;

pub use client::EventLogClient;
pub use errors::ClientError;
pub use project_lock::SlugWriteLockRegistry;
pub use renewal::{renewal_delays_from_env, spawn_subscription_renewal_daemon};
