// [apps/event-log/src/services/subscriber_eviction.rs]
/*!
 * =================================================================
 * APARATO: SUBSCRIBER EVICTION GUARD (V9.0 - RENEWAL ENFORCER)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: EVICCIÓN DE SUSCRIPTORES SIN RENOVACIÓN
 *
 * # Logic:
 * Los suscriptores renuevan su alta periódicamente; superado el
 * timeout de inactividad, la fila se purga del censo persistente y del
 * registro en RAM. Sus entregas huérfanas pasan al dominio del segador.
 * =================================================================
 */

use crate::state::AppState;
use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// Cadencia de la vigilancia de renovaciones.
const EVICTION_SWEEP_INTERVAL_SECONDS: u64 = 30;

/// Timeout de inactividad de un suscriptor (1 minuto).
const SUBSCRIBER_IDLE_TIMEOUT_SECONDS: i64 = 60;

pub struct SubscriberEvictionGuard {
    application_shared_state: AppState,
}

impl SubscriberEvictionGuard {
    #[must_use]
    pub fn new(application_state: AppState) -> Self {
        Self {
            application_shared_state: application_state,
        }
    }

    pub async fn spawn_guard_daemon(self) {
        let mut eviction_ticker = interval(Duration::from_secs(EVICTION_SWEEP_INTERVAL_SECONDS));
        eviction_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("🪦 [EVICTION]: Renewal enforcement daemon initiated.");

        loop {
            eviction_ticker.tick().await;

            let idle_cutoff =
                Utc::now() - ChronoDuration::seconds(SUBSCRIBER_IDLE_TIMEOUT_SECONDS);

            match self
                .application_shared_state
                .subscriber_repository
                .evict_stale(idle_cutoff)
                .await
            {
                Ok(evicted_members) => {
                    for (category, subscriber_url) in &evicted_members {
                        warn!(
                            "🪦 [EVICTION]: Subscriber [{}] timed out in [{}].",
                            subscriber_url, category
                        );
                        self.application_shared_state
                            .subscriber_registry
                            .remove(*category, subscriber_url);
                    }
                }
                Err(eviction_fault) => {
                    error!("❌ [EVICTION_FAULT]: Stale sweep collapsed: {}", eviction_fault);
                }
            }
        }
    }
}
