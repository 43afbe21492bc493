// [apps/event-log/src/services/producers/awaiting_generation.rs]
/*!
 * =================================================================
 * APARATO: AWAITING GENERATION PRODUCER (V8.0 - WEIGHTED ELECTION)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: SELECCIÓN NEW/RECOVERABLE -> GENERATING_TRIPLES
 *
 * # Logic (plantilla de selección):
 * 1. Proyectos candidatos: >=1 evento en {NEW, GENERATION_RECOVERABLE_
 *    FAILURE} con execution_date vencida; por proyecto solo el evento
 *    elegible más reciente; causalidad garantizada por el Ledger.
 * 2. Ocupación actual por proyecto (eventos ya en GENERATING_TRIPLES).
 * 3. Prioridad p en [0,1] (recencia x inverso de ocupación) y roster
 *    ponderado round(p*10).
 * 4. Sorteo uniforme sobre el roster.
 * 5. Reclamo CAS del evento elegible más reciente; carrera perdida =>
 *    None y reintento en el siguiente tick.
 * =================================================================
 */

use super::priority;
use super::{DispatchAccountability, DispatchCandidate, DispatchRoute};
use crate::state::AppState;
use chrono::Utc;
use graphline_domain_models::{EventCategory, EventEnvelope, EventStatus};
use tracing::{debug, instrument, warn};

/// Techo de eventos simultáneos en GENERATING_TRIPLES.
const GENERATION_CAPACITY_CEILING: i64 = 10;

/// Ancho del censo de candidatos por tick.
const CANDIDATE_SCAN_LIMIT: i64 = 20;

pub struct AwaitingGenerationProducer {
    application_shared_state: AppState,
}

impl AwaitingGenerationProducer {
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
            .count_in_status(EventStatus::GeneratingTriples)
            .await
        {
            Ok(in_flight_count) => in_flight_count >= GENERATION_CAPACITY_CEILING,
            Err(capacity_fault) => {
                warn!("⚠️ [PRODUCER_GEN]: Capacity query failed: {}. Throttling.", capacity_fault);
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
            .find_generation_candidates(local_now, CANDIDATE_SCAN_LIMIT)
            .await
        {
            Ok(candidates) => candidates,
            Err(selection_fault) => {
                warn!("⚠️ [PRODUCER_GEN]: Candidate scan failed: {}. Yielding.", selection_fault);
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
            .claim_for_generation(elected_project.project_id, &elected_project.slug, local_now)
            .await
        {
            Ok(Some(claimed_event)) => claimed_event,
            Ok(None) => {
                // CAS perdido o elegibilidad evaporada bajo nosotros.
                debug!(
                    "🔁 [PRODUCER_GEN]: Claim yielded for project [{}].",
                    elected_project.slug
                );
                return None;
            }
            Err(claim_fault) => {
                warn!("⚠️ [PRODUCER_GEN]: Claim failed: {}. Yielding.", claim_fault);
                return None;
            }
        };

        // Espejo de gauges tras el reclamo sellado.
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
            EventCategory::AwaitingGeneration,
            claimed_event.event_id.clone(),
            claimed_event.project.clone(),
        );

        Some(DispatchCandidate {
            category: EventCategory::AwaitingGeneration,
            event_part: serde_json::to_value(&envelope).ok()?,
            payload: None,
            route: DispatchRoute::RoundRobin,
            accountability: DispatchAccountability::Statused {
                event_id: claimed_event.event_id,
                project: claimed_event.project,
                processing_status: EventStatus::GeneratingTriples,
            },
        })
    }
}
