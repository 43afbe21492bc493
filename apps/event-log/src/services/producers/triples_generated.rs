// [apps/event-log/src/services/producers/triples_generated.rs]
/*!
 * =================================================================
 * APARATO: TRIPLES GENERATED PRODUCER (V8.0 - PAYLOAD CARRIER)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: SELECCIÓN GENERATED/RECOVERABLE -> TRANSFORMING
 *
 * # Logic:
 * Selección análoga a la plantilla de generación; el sobre transporta
 * el artefacto gzip retenido en el Ledger hacia el transformador.
 * =================================================================
 */

use super::priority;
use super::{DispatchAccountability, DispatchCandidate, DispatchRoute};
use crate::state::AppState;
use chrono::Utc;
use graphline_domain_models::{EventCategory, EventEnvelope, EventStatus};
use tracing::{debug, instrument, warn};

/// Techo de eventos simultáneos en TRANSFORMING_TRIPLES.
const TRANSFORMATION_CAPACITY_CEILING: i64 = 10;

const CANDIDATE_SCAN_LIMIT: i64 = 20;

pub struct TriplesGeneratedProducer {
    application_shared_state: AppState,
}

impl TriplesGeneratedProducer {
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
            .count_in_status(EventStatus::TransformingTriples)
            .await
        {
            Ok(in_flight_count) => in_flight_count >= TRANSFORMATION_CAPACITY_CEILING,
            Err(capacity_fault) => {
                warn!("⚠️ [PRODUCER_TG]: Capacity query failed: {}. Throttling.", capacity_fault);
                true
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn find_next(&self) -> Option<DispatchCandidate> {
        let local_now = Utc::now();

        let candidates = match self
            .application_shared_state
            .event_repository
            .find_transformation_candidates(local_now, CANDIDATE_SCAN_LIMIT)
            .await
        {
            Ok(candidates) => candidates,
            Err(selection_fault) => {
                warn!("⚠️ [PRODUCER_TG]: Candidate scan failed: {}. Yielding.", selection_fault);
                return None;
            }
        };

        if candidates.is_empty() {
            return None;
        }

        let weighted_roster = priority::build_weighted_roster(&candidates, local_now);
        let elected_index = priority::elect_candidate(&weighted_roster)?;
        let elected_project = &candidates[elected_index];

        let claimed_event = match self
            .application_shared_state
            .event_repository
            .claim_for_transformation(elected_project.project_id, &elected_project.slug, local_now)
            .await
        {
            Ok(Some(claimed_event)) => claimed_event,
            Ok(None) => {
                debug!(
                    "🔁 [PRODUCER_TG]: Claim yielded for project [{}].",
                    elected_project.slug
                );
                return None;
            }
            Err(claim_fault) => {
                warn!("⚠️ [PRODUCER_TG]: Claim failed: {}. Yielding.", claim_fault);
                return None;
            }
        };

        if claimed_event.payload.is_none() {
            // Invariante de retención violado aguas arriba: rastro y cesión.
            warn!(
                "❌ [PRODUCER_TG]: Event [{}] claimed without payload. Yielding.",
                claimed_event.event_id
            );
        }

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
            EventCategory::TriplesGenerated,
            claimed_event.event_id.clone(),
            claimed_event.project.clone(),
        );

        Some(DispatchCandidate {
            category: EventCategory::TriplesGenerated,
            event_part: serde_json::to_value(&envelope).ok()?,
            payload: claimed_event.payload,
            route: DispatchRoute::RoundRobin,
            accountability: DispatchAccountability::Statused {
                event_id: claimed_event.event_id,
                project: claimed_event.project,
                processing_status: EventStatus::TransformingTriples,
            },
        })
    }
}
