// [apps/event-log/src/services/transition_executor.rs]
/*!
 * =================================================================
 * APARATO: STATUS TRANSITION EXECUTOR (V9.0 - DEADLOCK RESILIENT)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L3)
 * RESPONSABILIDAD: EFECTOS DE DOMINIO DE CADA CAMBIO DE ESTADO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CUSTODY GUARD: Un suscriptor solo muta eventos cuya custodia
 *    registra la tabla de entregas; el rescate de zombies es la única
 *    vía interna que la omite.
 * 2. DEADLOCK RESILIENCE: Los fallos de serialización del Ledger se
 *    reintentan con back-off exponencial; cualquier otro fallo purga
 *    solo la entrega y se propaga.
 * 3. GAUGE MIRROR: Cada transición sellada ajusta los gauges; las
 *    operaciones en lote re-sincronizan el proyecto completo.
 * =================================================================
 */

use crate::state::AppState;
use chrono::Duration;
use graphline_domain_models::{
    EventId, EventMessage, EventStatus, ProjectId, ProjectSlug, StatusChangeRequest,
    ZippedEventPayload,
};
use graphline_infra_db::{StatusUpdateOutcome, StoreError};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Reintentos máximos ante deadlocks del Ledger.
const DEADLOCK_RETRY_LIMIT: u32 = 3;

/// Base del back-off exponencial entre reintentos (milisegundos).
const DEADLOCK_BACKOFF_BASE_MILLIS: u64 = 50;

/// Retraso por defecto de un fallo recuperable sin retraso explícito.
const DEFAULT_RECOVERABLE_DELAY_SECONDS: i64 = 300;

#[derive(Error, Debug)]
pub enum TransitionFault {
    /// El evento objetivo no existe en el Ledger.
    #[error("[L3_TRANSITION_FAULT]: EVENT_NOT_FOUND")]
    EventNotFound,

    /// El estado actual no admite la transición solicitada.
    #[error("[L3_TRANSITION_FAULT]: STATE_CONFLICT")]
    StateConflict,

    /// Ningún suscriptor posee la custodia del evento.
    #[error("[L3_TRANSITION_FAULT]: CUSTODY_VIOLATION")]
    CustodyViolation,

    /// La petición es inconsistente (payload ausente, estado ilegal).
    #[error("[L3_TRANSITION_FAULT]: MALFORMED_REQUEST -> {0}")]
    MalformedRequest(&'static str),

    /// Fallo de persistencia no recuperable localmente.
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct TransitionExecutor {
    application_shared_state: AppState,
}

impl TransitionExecutor {
    #[must_use]
    pub fn new(application_state: AppState) -> Self {
        Self {
            application_shared_state: application_state,
        }
    }

    /**
     * Aplica el cambio de estado con reintentos ante deadlock.
     *
     * # Errors:
     * - `CustodyViolation`: Transición de procesamiento sin entrega.
     * - `StateConflict` / `EventNotFound`: CAS rechazado por el Ledger.
     * - `Store`: Fallo de persistencia tras purgar la entrega.
     */
    #[instrument(skip(self, request, payload))]
    pub async fn execute(
        &self,
        request: &StatusChangeRequest,
        payload: Option<ZippedEventPayload>,
    ) -> Result<(), TransitionFault> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.apply_once(request, payload.clone()).await {
                Err(TransitionFault::Store(StoreError::DeadlockDetected))
                    if attempt <= DEADLOCK_RETRY_LIMIT =>
                {
                    let backoff_millis = DEADLOCK_BACKOFF_BASE_MILLIS * 2u64.pow(attempt - 1);
                    warn!(
                        "🔁 [TRANSITION]: Deadlock on attempt {}. Backing off {}ms.",
                        attempt, backoff_millis
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(backoff_millis)).await;
                }
                Err(TransitionFault::Store(store_fault)) => {
                    // Otros fallos: purgar solo la entrega y propagar.
                    if let Some(event_id) = request.event_id() {
                        let _ = self
                            .application_shared_state
                            .delivery_repository
                            .remove(event_id, request.project().id)
                            .await;
                    }
                    return Err(TransitionFault::Store(store_fault));
                }
                other_outcome => return other_outcome,
            }
        }
    }

    async fn apply_once(
        &self,
        request: &StatusChangeRequest,
        payload: Option<ZippedEventPayload>,
    ) -> Result<(), TransitionFault> {
        if !request.failure_target_is_legal() {
            return Err(TransitionFault::MalformedRequest("newStatus is not a failure status"));
        }

        let project = request.project().clone();
        let events = &self.application_shared_state.event_repository;

        match request {
            StatusChangeRequest::ToTriplesGenerated {
                id,
                processing_time_millis,
                ..
            } => {
                let Some(zipped_payload) = payload else {
                    return Err(TransitionFault::MalformedRequest(
                        "ToTriplesGenerated requires a payload part",
                    ));
                };

                self.assert_custody(id, project.id).await?;

                let outcome = events
                    .to_triples_generated(id, project.id, zipped_payload, *processing_time_millis)
                    .await?;
                self.seal_single(outcome, &project.slug, EventStatus::GeneratingTriples,
                    EventStatus::TriplesGenerated)?;
                Ok(())
            }

            StatusChangeRequest::ToTriplesStore {
                id,
                processing_time_millis,
                ..
            } => {
                self.assert_custody(id, project.id).await?;

                let outcome = events
                    .to_triples_store(id, project.id, *processing_time_millis)
                    .await?;
                Self::map_outcome(outcome)?;

                // Promoción en lote: espejo completo del proyecto.
                self.resync_project_gauges(project.id, &project.slug).await;
                info!("🏁 [TRANSITION]: Event [{}] certified in triples store.", id);
                Ok(())
            }

            StatusChangeRequest::ToFailure {
                id,
                new_status,
                message,
                execution_delay_seconds,
                ..
            } => {
                let Some(failure_message) = EventMessage::new(message.clone()) else {
                    return Err(TransitionFault::MalformedRequest("failure message is blank"));
                };

                self.assert_custody(id, project.id).await?;

                let recoverable = matches!(
                    new_status,
                    EventStatus::GenerationRecoverableFailure
                        | EventStatus::TransformationRecoverableFailure
                );
                let execution_delay = if recoverable {
                    Some(Duration::seconds(
                        execution_delay_seconds.unwrap_or(DEFAULT_RECOVERABLE_DELAY_SECONDS),
                    ))
                } else {
                    None
                };

                let outcome = events
                    .to_failure(id, project.id, *new_status, failure_message, execution_delay)
                    .await?;

                let source_status = match new_status {
                    EventStatus::GenerationRecoverableFailure
                    | EventStatus::GenerationNonRecoverableFailure => {
                        EventStatus::GeneratingTriples
                    }
                    _ => EventStatus::TransformingTriples,
                };
                self.seal_single(outcome, &project.slug, source_status, *new_status)?;
                Ok(())
            }

            StatusChangeRequest::ToGenerationNonRecoverableFailure { id, message, .. } => {
                let Some(failure_message) = EventMessage::new(message.clone()) else {
                    return Err(TransitionFault::MalformedRequest("failure message is blank"));
                };

                self.assert_custody(id, project.id).await?;

                let outcome = events
                    .to_failure(
                        id,
                        project.id,
                        EventStatus::GenerationNonRecoverableFailure,
                        failure_message,
                        None,
                    )
                    .await?;
                self.seal_single(
                    outcome,
                    &project.slug,
                    EventStatus::GeneratingTriples,
                    EventStatus::GenerationNonRecoverableFailure,
                )?;
                Ok(())
            }

            StatusChangeRequest::ToNew { id, .. } => {
                let outcome = events.to_new(id, project.id).await?;
                Self::map_outcome(outcome)?;
                self.resync_project_gauges(project.id, &project.slug).await;
                Ok(())
            }

            StatusChangeRequest::RollbackToNew { id, .. } => {
                self.assert_custody(id, project.id).await?;

                let outcome = events.rollback_to_new(id, project.id).await?;
                self.seal_single(
                    outcome,
                    &project.slug,
                    EventStatus::GeneratingTriples,
                    EventStatus::New,
                )?;
                Ok(())
            }

            StatusChangeRequest::RollbackToTriplesGenerated { id, .. } => {
                self.assert_custody(id, project.id).await?;

                let outcome = events.rollback_to_triples_generated(id, project.id).await?;
                self.seal_single(
                    outcome,
                    &project.slug,
                    EventStatus::TransformingTriples,
                    EventStatus::TriplesGenerated,
                )?;
                Ok(())
            }

            StatusChangeRequest::ToAwaitingDeletion { id, .. } => {
                let outcome = events.to_awaiting_deletion(id, project.id).await?;
                Self::map_outcome(outcome)?;
                self.resync_project_gauges(project.id, &project.slug).await;
                Ok(())
            }

            StatusChangeRequest::RedoProjectTransformation { .. } => {
                let requeued = events.redo_project_transformation(project.id).await?;
                self.resync_project_gauges(project.id, &project.slug).await;
                info!(
                    "♻️  [TRANSITION]: Project [{}] requeued {} events for re-transformation.",
                    project.slug, requeued
                );
                Ok(())
            }

            StatusChangeRequest::ProjectEventsToNew { .. } => {
                let rearmed = events.project_events_to_new(project.id).await?;
                self.resync_project_gauges(project.id, &project.slug).await;
                info!(
                    "♻️  [TRANSITION]: Project [{}] rearmed {} events to NEW.",
                    project.slug, rearmed
                );
                Ok(())
            }
        }
    }

    /// Guardia de custodia: la entrega debe existir para el evento.
    async fn assert_custody(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
    ) -> Result<(), TransitionFault> {
        let custody_exists = self
            .application_shared_state
            .delivery_repository
            .exists(event_id, project_id)
            .await?;

        if custody_exists {
            Ok(())
        } else {
            Err(TransitionFault::CustodyViolation)
        }
    }

    /// Sella una transición puntual: mapea el desenlace y mueve gauges.
    fn seal_single(
        &self,
        outcome: StatusUpdateOutcome,
        slug: &ProjectSlug,
        from_status: EventStatus,
        to_status: EventStatus,
    ) -> Result<(), TransitionFault> {
        Self::map_outcome(outcome)?;
        self.application_shared_state
            .status_gauges
            .move_gauge(slug, from_status, to_status);
        Ok(())
    }

    fn map_outcome(outcome: StatusUpdateOutcome) -> Result<(), TransitionFault> {
        match outcome {
            StatusUpdateOutcome::Updated => Ok(()),
            StatusUpdateOutcome::NotFound => Err(TransitionFault::EventNotFound),
            StatusUpdateOutcome::Conflict => Err(TransitionFault::StateConflict),
        }
    }

    async fn resync_project_gauges(&self, project_id: ProjectId, slug: &ProjectSlug) {
        if let Ok(project_census) = self
            .application_shared_state
            .event_repository
            .project_status_census(project_id)
            .await
        {
            self.application_shared_state
                .status_gauges
                .resync_project(slug, project_census);
        }
    }
}
