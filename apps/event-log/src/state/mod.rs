// [apps/event-log/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN STATE ORCHESTRATOR (V8.0 - EVENT FABRIC)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ORQUESTACIÓN DE ESTRATOS Y REPOSITORIOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. COMPOSITION ROOT: Centraliza el rastro de los repositorios del
 *    Ledger y los gestores en RAM (registro de suscriptores, gauges).
 * 2. NOMINAL PURITY: Uso de 'Arc<T>' para inmutabilidad compartida
 *    entre handlers HTTP y daemons de fondo.
 *
 * # Mathematical Proof (Deterministic State Hub):
 * Cualquier transición sellada en el Ledger es visible al instante por
 * los gauges y por el registro, porque ambos se mutan en el mismo flujo
 * de ejecución que comete la transacción.
 * =================================================================
 */

pub mod status_gauges;
pub mod subscriber_registry;

use graphline_infra_db::{
    DeliveryRepository, EventRepository, MigrationRepository, ProjectRepository, StoreClient,
    StoreError, SubscriberRepository, SyncTimeRepository,
};
use std::sync::Arc;
use tracing::debug;

/**
 * Contenedor de estado compartido (Thread-Safe) del Event Log.
 * Actúa como la placa base donde se conectan todos los estratos.
 */
#[derive(Clone)]
pub struct AppState {
    /// Cliente del Ledger de eventos (libSQL).
    pub store_client: StoreClient,
    /// Registro en RAM de suscriptores por categoría (round-robin).
    pub subscriber_registry: Arc<subscriber_registry::SubscriberRegistryManager>,
    /// Gauges de estado por (slug, estado) para el dashboard.
    pub status_gauges: Arc<status_gauges::StatusGaugeManager>,

    // --- REPOSITORIOS DE AUTORIDAD DEL LEDGER ---
    pub event_repository: Arc<EventRepository>,
    pub delivery_repository: Arc<DeliveryRepository>,
    pub project_repository: Arc<ProjectRepository>,
    pub subscriber_repository: Arc<SubscriberRepository>,
    pub sync_time_repository: Arc<SyncTimeRepository>,
    pub migration_repository: Arc<MigrationRepository>,
}

impl AppState {
    /**
     * Forja el Estado Maestro y reconstruye los gauges desde el Ledger.
     */
    pub async fn ignite(store_client: StoreClient) -> Result<Self, StoreError> {
        debug!("🧬 [APP_STATE]: Executing sovereign ignition sequence V8.0...");

        let event_repository = Arc::new(EventRepository::new(store_client.clone()));
        let status_gauges = Arc::new(status_gauges::StatusGaugeManager::new());

        // Reconstrucción de gauges: el Ledger es la fuente de verdad.
        let ledger_census = event_repository.status_census().await?;
        status_gauges.rebuild(ledger_census);

        Ok(Self {
            subscriber_registry: Arc::new(
                subscriber_registry::SubscriberRegistryManager::new(),
            ),
            status_gauges,
            event_repository,
            delivery_repository: Arc::new(DeliveryRepository::new(store_client.clone())),
            project_repository: Arc::new(ProjectRepository::new(store_client.clone())),
            subscriber_repository: Arc::new(SubscriberRepository::new(store_client.clone())),
            sync_time_repository: Arc::new(SyncTimeRepository::new(store_client.clone())),
            migration_repository: Arc::new(MigrationRepository::new(store_client.clone())),
            store_client,
        })
    }
}
