// [apps/event-log/src/services/producers/clean_up.rs]
/*!
 * =================================================================
 * APARATO: CLEAN UP PRODUCER (V8.0 - DELETION CYCLE)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: SELECCIÓN AWAITING_DELETION -> DELETING
 * =================================================================
 */

use super::{DispatchAccountability, DispatchCandidate, DispatchRoute};
use crate::state::AppState;
use chrono::Utc;
use graphline_domain_models::{EventCategory, EventEnvelope, EventStatus};
use tracing::warn;

/// Techo de borrados simultáneos en vuelo.
const DELETION_CAPACITY_CEILING: i64 = 4;

pub struct CleanUpProducer {
    application_shared_state: AppState,
}

impl CleanUpProducer {
    #[must_use]
    pub fn new(application_state: AppState) -> Self {
        Self {
            application_shared_state: application_state,
        }
    }

    pub async fn is_throttled(&self) -> bool {
        match self
            .application_shared_state
            .event_repository
            .count_in_status(EventStatus::Deleting)
            .await
        {
            Ok(in_flight_count) => in_flight_count >= DELETION_CAPACITY_CEILING,
            Err(capacity_fault) => {
                warn!("⚠️ [PRODUCER_CLEANUP]: Capacity query failed: {}. Throttling.", capacity_fault);
                true
            }
        }
    }

    pub async fn find_next(&self) -> Option<DispatchCandidate> {
        let claimed_event = match self
            .application_shared_state
            .event_repository
            .claim_for_deletion(Utc::now())
            .await
        {
            Ok(claimed_event) => claimed_event?,
            Err(claim_fault) => {
                warn!("⚠️ [PRODUCER_CLEANUP]: Claim failed: {}. Yielding.", claim_fault);
                return None;
            }
        };

        if let Ok(project_census) = self
            .application_shared_state
            .event_repository
            .project_status_census(claimed_event.project.id)
            .await
        {
            self.application_shared_state
                .status_gauges
                .resync_project(&claimed_event.project.slug, project_census);
        }

        let envelope = EventEnvelope::statused(
            EventCategory::CleanUp,
            claimed_event.event_id.clone(),
            claimed_event.project.clone(),
        );

        Some(DispatchCandidate {
            category: EventCategory::CleanUp,
            event_part: serde_json::to_value(&envelope).ok()?,
            payload: None,
            route: DispatchRoute::RoundRobin,
            accountability: DispatchAccountability::Statused {
                event_id: claimed_event.event_id,
                project: claimed_event.project,
                processing_status: EventStatus::Deleting,
            },
        })
    }
}
