// [apps/webhook-gateway/src/services/commit_sync_relay.rs]
/*!
 * =================================================================
 * APARATO: COMMIT SYNC RELAY (V6.0 - BOUNDED RESILIENCE)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: PUBLICACIÓN RESILIENTE HACIA EL EVENT LOG
 *
 * # Logic:
 * El ACK del webhook ya fue emitido: este relevo es la única custodia
 * de la notificación. Reintenta con back-off lineal acotado; agotados
 * los intentos deja rastro forense (el Forge re-notificará en el
 * próximo push y la sincronización periódica cubre el hueco).
 * =================================================================
 */

use graphline_domain_models::CommitSyncRequest;
use graphline_event_log_client::EventLogClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Intentos máximos de publicación.
const MAX_PUBLISH_ATTEMPTS: u32 = 10;

/// Back-off lineal entre intentos.
const PUBLISH_RETRY_BACKOFF_SECONDS: u64 = 10;

pub struct CommitSyncRelayService {
    event_log_uplink: Arc<EventLogClient>,
}

impl CommitSyncRelayService {
    #[must_use]
    pub fn new(event_log_uplink: Arc<EventLogClient>) -> Self {
        Self { event_log_uplink }
    }

    /// Publica con reintentos acotados; `true` si el log aceptó.
    pub async fn publish_with_retries(&self, commit_sync: CommitSyncRequest) -> bool {
        for publish_attempt in 1..=MAX_PUBLISH_ATTEMPTS {
            match self
                .event_log_uplink
                .post_commit_sync_request(&commit_sync)
                .await
            {
                Ok(()) => {
                    debug!(
                        "✅ [RELAY]: Commit sync [{}] accepted by the event log.",
                        commit_sync.id
                    );
                    return true;
                }
                Err(publish_fault) => {
                    warn!(
                        "⚠️ [RELAY]: Attempt {}/{} for commit [{}] failed: {}",
                        publish_attempt, MAX_PUBLISH_ATTEMPTS, commit_sync.id, publish_fault
                    );

                    if publish_attempt < MAX_PUBLISH_ATTEMPTS {
                        sleep(Duration::from_secs(PUBLISH_RETRY_BACKOFF_SECONDS)).await;
                    }
                }
            }
        }

        error!(
            "❌ [RELAY_EXHAUSTED]: Commit sync [{}] dropped after {} attempts.",
            commit_sync.id, MAX_PUBLISH_ATTEMPTS
        );
        false
    }
}
