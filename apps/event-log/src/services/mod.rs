// [apps/event-log/src/services/mod.rs]
/*!
 * =================================================================
 * APARATO: SERVICES BARREL (V9.0 - DISPATCH FABRIC)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICIÓN DE DAEMONS Y EJECUTORES
 * =================================================================
 */

/// Entrega de sobres con rastro de custodia y protocolo de pérdida.
pub mod dispatcher;
/// Selección de eventos elegibles por categoría.
pub mod producers;
/// Espejo RAM del censo de suscriptores.
pub mod registry_refresher;
/// Evicción de suscriptores sin renovación.
pub mod subscriber_eviction;
/// Efectos de dominio de los cambios de estado (canal de retorno).
pub mod transition_executor;
/// Rescate de eventos en vuelo sin dueño.
pub mod zombie_reaper;

pub use dispatcher::DispatchOrchestrator;
pub use registry_refresher::RegistryRefreshDaemon;
pub use subscriber_eviction::SubscriberEvictionGuard;
pub use transition_executor::{TransitionExecutor, TransitionFault};
pub use zombie_reaper::ZombieReaperService;
