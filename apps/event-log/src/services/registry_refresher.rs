// [apps/event-log/src/services/registry_refresher.rs]
/*!
 * =================================================================
 * APARATO: REGISTRY REFRESH DAEMON (V9.0 - LEDGER MIRROR)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: ESPEJO RAM <- LEDGER DEL CENSO DE SUSCRIPTORES
 *
 * # Logic:
 * El registro en RAM es lectura-dominante; el Ledger es la verdad.
 * El daemon re-hidrata cada shard de categoría para absorber altas y
 * bajas realizadas por otros flujos (evicción, suscriptor perdido).
 * =================================================================
 */

use crate::state::subscriber_registry::RegisteredSubscriber;
use crate::state::AppState;
use graphline_domain_models::EventCategory;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Cadencia del refresco del espejo.
const REGISTRY_REFRESH_INTERVAL_SECONDS: u64 = 30;

/// Categorías con pool de suscriptores.
const SUBSCRIPTION_CATEGORIES: [EventCategory; 7] = [
    EventCategory::AwaitingGeneration,
    EventCategory::TriplesGenerated,
    EventCategory::CommitSync,
    EventCategory::GlobalCommitSync,
    EventCategory::MemberSync,
    EventCategory::CleanUp,
    EventCategory::TsMigrationRequest,
];

pub struct RegistryRefreshDaemon {
    application_shared_state: AppState,
}

impl RegistryRefreshDaemon {
    #[must_use]
    pub fn new(application_state: AppState) -> Self {
        Self {
            application_shared_state: application_state,
        }
    }

    pub async fn spawn_refresh_daemon(self) {
        let mut refresh_ticker = interval(Duration::from_secs(REGISTRY_REFRESH_INTERVAL_SECONDS));
        refresh_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("🔄 [REGISTRY]: Mirror refresh daemon initiated.");

        loop {
            refresh_ticker.tick().await;
            self.refresh_all_categories().await;
        }
    }

    /// Una pasada completa de refresco; expuesta para el Proving Grounds.
    pub async fn refresh_all_categories(&self) {
        for category in SUBSCRIPTION_CATEGORIES {
            match self
                .application_shared_state
                .subscriber_repository
                .list_for_category(category)
                .await
            {
                Ok(census_rows) => {
                    let mirrored_members: Vec<RegisteredSubscriber> = census_rows
                        .into_iter()
                        .map(|row| RegisteredSubscriber {
                            url: row.url,
                            id: row.id,
                            version: row.version,
                            capacity: row.capacity,
                        })
                        .collect();

                    self.application_shared_state
                        .subscriber_registry
                        .replace_category(category, mirrored_members);
                }
                Err(refresh_fault) => {
                    warn!(
                        "⚠️ [REGISTRY]: Mirror refresh failed for [{}]: {}",
                        category, refresh_fault
                    );
                }
            }
        }
    }
}
