// [apps/event-log/src/services/producers/project_sync.rs]
/*!
 * =================================================================
 * APARATO: PROJECT SYNC PRODUCER (V8.0 - WATERMARK DRIVEN)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: CANALES COMMIT_SYNC / GLOBAL_COMMIT_SYNC / MEMBER_SYNC
 *
 * # Logic:
 * Las categorías de sincronización no mutan el log: eligen el proyecto
 * con el watermark más estancado bajo el intervalo de la categoría.
 * El watermark avanza solo cuando el suscriptor acepta el sobre, de
 * modo que un worker caído no pierde ciclos de sincronización.
 * =================================================================
 */

use super::{DispatchAccountability, DispatchCandidate, DispatchRoute};
use crate::state::AppState;
use chrono::{Duration, Utc};
use graphline_domain_models::{EventCategory, EventEnvelope};
use tracing::warn;

/// Intervalo de sincronización de commits por proyecto (1 hora).
const COMMIT_SYNC_INTERVAL_SECONDS: i64 = 3_600;

/// Intervalo del barrido global de commits (7 días).
const GLOBAL_COMMIT_SYNC_INTERVAL_SECONDS: i64 = 7 * 24 * 3_600;

/// Intervalo de sincronización de miembros (1 hora).
const MEMBER_SYNC_INTERVAL_SECONDS: i64 = 3_600;

pub struct ProjectSyncProducer {
    application_shared_state: AppState,
    sync_category: EventCategory,
    sync_interval: Duration,
}

impl ProjectSyncProducer {
    #[must_use]
    pub fn commit_sync(application_state: AppState) -> Self {
        Self {
            application_shared_state: application_state,
            sync_category: EventCategory::CommitSync,
            sync_interval: Duration::seconds(COMMIT_SYNC_INTERVAL_SECONDS),
        }
    }

    #[must_use]
    pub fn global_commit_sync(application_state: AppState) -> Self {
        Self {
            application_shared_state: application_state,
            sync_category: EventCategory::GlobalCommitSync,
            sync_interval: Duration::seconds(GLOBAL_COMMIT_SYNC_INTERVAL_SECONDS),
        }
    }

    #[must_use]
    pub fn member_sync(application_state: AppState) -> Self {
        Self {
            application_shared_state: application_state,
            sync_category: EventCategory::MemberSync,
            sync_interval: Duration::seconds(MEMBER_SYNC_INTERVAL_SECONDS),
        }
    }

    #[must_use]
    pub fn category(&self) -> EventCategory {
        self.sync_category
    }

    pub async fn find_next(&self) -> Option<DispatchCandidate> {
        let freshness_cutoff = Utc::now() - self.sync_interval;

        let stalest_project = match self
            .application_shared_state
            .sync_time_repository
            .find_stalest_project(self.sync_category, freshness_cutoff)
            .await
        {
            Ok(stalest_project) => stalest_project?,
            Err(watermark_fault) => {
                warn!(
                    "⚠️ [PRODUCER_SYNC]: Watermark scan failed for [{}]: {}. Yielding.",
                    self.sync_category, watermark_fault
                );
                return None;
            }
        };

        let project_id = stalest_project.id;
        let envelope = EventEnvelope::project_sync(self.sync_category, stalest_project);

        Some(DispatchCandidate {
            category: self.sync_category,
            event_part: serde_json::to_value(&envelope).ok()?,
            payload: None,
            route: DispatchRoute::RoundRobin,
            accountability: DispatchAccountability::ProjectSync { project_id },
        })
    }
}
