// [libs/infra/db-store/src/repositories/event/mod.rs]
/*!
 * =================================================================
 * APARATO: EVENT REPOSITORY (V12.0 - CAS GUARDED)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA COMPLETO DEL LOG DE EVENTOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SEMANTIC ERROR HANDLING: 'StoreError' distingue deadlocks
 *    reintentables de fallos de consulta, habilitando la recuperación
 *    autonómica en el ejecutor de transiciones.
 * 2. READ-THEN-CAS: Toda transición lee el estado bajo transacción y
 *    sella con una guardia exacta de estado; el perdedor de la carrera
 *    afecta cero filas y reporta Conflict.
 * 3. ZERO ABBREVIATIONS: Nomenclatura nominal absoluta en conexiones,
 *    transacciones y resultados de consulta.
 *
 * # Mathematical Proof (Transactional Exclusivity):
 * El repositorio implementa un semáforo ACID por (event_id, project_id).
 * Al encapsular lectura y actualización del estado dentro de una
 * transacción con guardia, se garantiza que dos despachos concurrentes
 * nunca posean el mismo evento.
 * =================================================================
 */

pub mod queries;

use crate::chronicle::{decode_timestamp, encode_timestamp};
use crate::client::StoreClient;
use crate::errors::StoreError;
use chrono::{DateTime, Duration, Utc};
use graphline_domain_models::{
    BatchDate, Event, EventDate, EventId, EventMessage, EventStatus, ExecutionDate, ProcessingTime,
    ProjectId, ProjectReference, ProjectSlug, ZippedEventPayload,
};
use libsql::{params, Connection, Row, Value};
use tracing::{debug, info, instrument, warn};

use self::queries as sql_registry;

/// Desenlace de la operación de upsert del log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// El evento no existía y fue creado en NEW.
    Created,
    /// El evento existía en un estado re-arrancable y fue reiniciado a NEW.
    Existed,
    /// El evento existía en un estado que no admite reinicio; intacto.
    Skipped,
}

/// Desenlace de una transición de estado CAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdateOutcome {
    Updated,
    NotFound,
    Conflict,
}

/// Mutaciones que acompañan una transición dentro de la misma transacción.
#[derive(Debug, Default)]
pub struct StatusMutation {
    pub set_message: Option<EventMessage>,
    pub clear_message: bool,
    pub set_payload: Option<ZippedEventPayload>,
    pub delete_payload: bool,
    pub append_processing_time: Option<ProcessingTime>,
    pub set_execution_date: Option<DateTime<Utc>>,
    pub clear_delivery: bool,
}

/// Proyecto candidato devuelto por la selección de productores.
#[derive(Debug, Clone)]
pub struct ProjectCandidate {
    pub project_id: ProjectId,
    pub slug: ProjectSlug,
    pub latest_eligible_date: DateTime<Utc>,
    pub occupancy: i64,
}

/// Evento reclamado y listo para formar un sobre de despacho.
#[derive(Debug, Clone)]
pub struct DispatchableEvent {
    pub event_id: EventId,
    pub project: ProjectReference,
    pub event_date: DateTime<Utc>,
    pub payload: Option<ZippedEventPayload>,
}

/// Evento en estado de procesamiento sin dueño verificable.
#[derive(Debug, Clone)]
pub struct ZombieEvent {
    pub event_id: EventId,
    pub project_id: ProjectId,
    pub status: EventStatus,
}

/**
 * Repositorio de autoridad única para el log de eventos.
 */
pub struct EventRepository {
    store_client: StoreClient,
}

impl EventRepository {
    #[must_use]
    pub fn new(store_client: StoreClient) -> Self {
        Self { store_client }
    }

    // ------------------------------------------------------------------
    // ESTRATO DE INGESTA
    // ------------------------------------------------------------------

    /**
     * Inserta el evento si no existe; si existe en un estado
     * re-arrancable (SKIPPED / NEW / GENERATION_RECOVERABLE_FAILURE) lo
     * reinicia a NEW; en cualquier otro estado lo deja intacto.
     * Crea el proyecto de forma perezosa con su slug inmutable.
     */
    #[instrument(skip(self, project))]
    pub async fn upsert_event(
        &self,
        event_id: &EventId,
        project: &ProjectReference,
        event_date: EventDate,
    ) -> Result<UpsertOutcome, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        ledger_transaction
            .execute(
                sql_registry::ENSURE_PROJECT,
                params![project.id.value(), project.slug.as_str()],
            )
            .await?;

        let mut status_rows = ledger_transaction
            .query(
                sql_registry::FIND_STATUS,
                params![event_id.as_str(), project.id.value()],
            )
            .await?;

        let local_now = Utc::now();
        let batch_stamp = encode_timestamp(BatchDate::now().instant());

        let outcome = match status_rows.next().await? {
            None => {
                ledger_transaction
                    .execute(
                        sql_registry::INSERT_NEW_EVENT,
                        params![
                            event_id.as_str(),
                            project.id.value(),
                            encode_timestamp(event_date.instant()),
                            encode_timestamp(local_now),
                            encode_timestamp(local_now),
                            batch_stamp
                        ],
                    )
                    .await?;
                UpsertOutcome::Created
            }
            Some(status_row) => {
                let current_status_label: String = status_row.get(0)?;
                let affected_rows = ledger_transaction
                    .execute(
                        sql_registry::RESET_EVENT_TO_NEW,
                        params![
                            event_id.as_str(),
                            project.id.value(),
                            encode_timestamp(local_now),
                            batch_stamp
                        ],
                    )
                    .await?;

                if affected_rows == 1 {
                    debug!(
                        "♻️  [LEDGER]: Event [{}] rearmed to NEW from [{}].",
                        event_id, current_status_label
                    );
                    UpsertOutcome::Existed
                } else {
                    UpsertOutcome::Skipped
                }
            }
        };

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // ESTRATO DE LECTURA
    // ------------------------------------------------------------------

    pub async fn find_event(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
    ) -> Result<Option<Event>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut event_rows = ledger_connection
            .query(
                sql_registry::FIND_EVENT,
                params![event_id.as_str(), project_id.value()],
            )
            .await?;

        match event_rows.next().await? {
            None => Ok(None),
            Some(event_row) => {
                let mut hydrated = Self::hydrate_event(&event_row)?;
                hydrated.processing_times = self
                    .load_processing_times(&ledger_connection, event_id, project_id)
                    .await?;
                Ok(Some(hydrated))
            }
        }
    }

    /// Enumera los eventos del proyecto en orden ascendente de dominio.
    pub async fn find_project_events(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Event>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut event_rows = ledger_connection
            .query(sql_registry::FIND_PROJECT_EVENTS, params![project_id.value()])
            .await?;

        let mut project_events = Vec::new();
        while let Some(event_row) = event_rows.next().await? {
            project_events.push(Self::hydrate_event(&event_row)?);
        }

        for hydrated in &mut project_events {
            hydrated.processing_times = self
                .load_processing_times(&ledger_connection, &hydrated.event_id, project_id)
                .await?;
        }

        Ok(project_events)
    }

    /// Capacity query: eventos residentes en un estado dado.
    pub async fn count_in_status(&self, status: EventStatus) -> Result<i64, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut count_rows = ledger_connection
            .query(sql_registry::COUNT_IN_STATUS, params![status.as_str()])
            .await?;

        match count_rows.next().await? {
            Some(count_row) => Ok(count_row.get(0)?),
            None => Ok(0),
        }
    }

    // ------------------------------------------------------------------
    // ESTRATO DE TRANSICIONES CAS
    // ------------------------------------------------------------------

    /**
     * Transición atómica de estado con mutaciones asociadas.
     *
     * # Logic:
     * 1. Lee el estado bajo transacción: ausencia => NotFound.
     * 2. Estado fuera del conjunto origen => Conflict.
     * 3. UPDATE con guardia exacta del estado leído; cero filas
     *    afectadas => Conflict (carrera perdida).
     * 4. Mutaciones (tiempo de fase, entrega) en la misma transacción.
     */
    #[instrument(skip(self, mutation, from_statuses))]
    pub async fn update_status(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
        from_statuses: &[EventStatus],
        to_status: EventStatus,
        mutation: StatusMutation,
    ) -> Result<StatusUpdateOutcome, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        let mut current_rows = ledger_transaction
            .query(
                "SELECT status, message, payload, execution_date FROM events \
                 WHERE event_id = ?1 AND project_id = ?2",
                params![event_id.as_str(), project_id.value()],
            )
            .await?;

        let Some(current_row) = current_rows.next().await? else {
            return Ok(StatusUpdateOutcome::NotFound);
        };

        let current_status_label: String = current_row.get(0)?;
        let current_status = EventStatus::from_wire(&current_status_label).ok_or_else(|| {
            StoreError::MappingError(format!("unknown status '{current_status_label}' in ledger"))
        })?;

        if !from_statuses.contains(&current_status) {
            return Ok(StatusUpdateOutcome::Conflict);
        }

        let current_message: Option<String> = current_row.get(1)?;
        let current_payload: Option<Vec<u8>> = current_row.get(2)?;
        let current_execution: String = current_row.get(3)?;

        let next_message: Value = if mutation.clear_message {
            Value::Null
        } else if let Some(message) = &mutation.set_message {
            Value::Text(message.as_str().to_string())
        } else {
            current_message.map_or(Value::Null, Value::Text)
        };

        let next_payload: Value = if mutation.delete_payload {
            Value::Null
        } else if let Some(payload) = &mutation.set_payload {
            Value::Blob(payload.as_bytes().to_vec())
        } else {
            current_payload.map_or(Value::Null, Value::Blob)
        };

        let next_execution: Value = match mutation.set_execution_date {
            Some(execution_instant) => Value::Text(encode_timestamp(execution_instant)),
            None => Value::Text(current_execution),
        };

        let affected_rows = ledger_transaction
            .execute(
                "UPDATE events SET status = ?3, message = ?4, payload = ?5, execution_date = ?6 \
                 WHERE event_id = ?1 AND project_id = ?2 AND status = ?7",
                params![
                    event_id.as_str(),
                    project_id.value(),
                    to_status.as_str(),
                    next_message,
                    next_payload,
                    next_execution,
                    current_status.as_str()
                ],
            )
            .await?;

        if affected_rows == 0 {
            return Ok(StatusUpdateOutcome::Conflict);
        }

        if let Some(processing_time) = &mutation.append_processing_time {
            ledger_transaction
                .execute(
                    sql_registry::APPEND_PROCESSING_TIME,
                    params![
                        event_id.as_str(),
                        project_id.value(),
                        processing_time.status.as_str(),
                        processing_time.duration_millis
                    ],
                )
                .await?;
        }

        if mutation.clear_delivery {
            ledger_transaction
                .execute(
                    sql_registry::DELETE_EVENT_DELIVERY,
                    params![event_id.as_str(), project_id.value()],
                )
                .await?;
        }

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        Ok(StatusUpdateOutcome::Updated)
    }

    /**
     * Certificación final: el evento pasa a TRIPLES_STORE y todo evento
     * del proyecto con fecha de dominio no posterior que siga en fase
     * temprana es promovido en el mismo acto atómico.
     */
    #[instrument(skip(self))]
    pub async fn to_triples_store(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
        processing_time_millis: i64,
    ) -> Result<StatusUpdateOutcome, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        let mut current_rows = ledger_transaction
            .query(
                "SELECT status, event_date FROM events WHERE event_id = ?1 AND project_id = ?2",
                params![event_id.as_str(), project_id.value()],
            )
            .await?;

        let Some(current_row) = current_rows.next().await? else {
            return Ok(StatusUpdateOutcome::NotFound);
        };

        let current_status_label: String = current_row.get(0)?;
        if EventStatus::from_wire(&current_status_label) != Some(EventStatus::TransformingTriples) {
            return Ok(StatusUpdateOutcome::Conflict);
        }

        let certified_event_date: String = current_row.get(1)?;

        // Promoción en lote: cubre también al evento certificado.
        let promoted_rows = ledger_transaction
            .execute(
                sql_registry::PROMOTE_BATCH_TO_TRIPLES_STORE,
                params![project_id.value(), certified_event_date.clone()],
            )
            .await?;

        ledger_transaction
            .execute(sql_registry::PURGE_BATCH_DELIVERIES, params![project_id.value()])
            .await?;

        ledger_transaction
            .execute(
                sql_registry::APPEND_PROCESSING_TIME,
                params![
                    event_id.as_str(),
                    project_id.value(),
                    EventStatus::TriplesStore.as_str(),
                    processing_time_millis
                ],
            )
            .await?;

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        info!(
            "🏁 [LEDGER]: Event [{}] certified in triples store; batch of {} promoted.",
            event_id, promoted_rows
        );
        Ok(StatusUpdateOutcome::Updated)
    }

    /**
     * Registra un fallo de fase. Los fallos recuperables posponen la
     * elegibilidad (`execution_date := now + delay`); los terminales
     * retienen el rastro en `message` y purgan el payload.
     */
    #[instrument(skip(self, message))]
    pub async fn to_failure(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
        failure_status: EventStatus,
        message: EventMessage,
        execution_delay: Option<Duration>,
    ) -> Result<StatusUpdateOutcome, StoreError> {
        let from_statuses: &[EventStatus] = match failure_status {
            EventStatus::GenerationRecoverableFailure
            | EventStatus::GenerationNonRecoverableFailure => &[EventStatus::GeneratingTriples],
            EventStatus::TransformationRecoverableFailure
            | EventStatus::TransformationNonRecoverableFailure => {
                &[EventStatus::TransformingTriples]
            }
            _ => return Err(StoreError::TransitionConflict),
        };

        let mutation = StatusMutation {
            set_message: Some(message),
            delete_payload: !failure_status.may_retain_payload(),
            set_execution_date: execution_delay.map(|delay| Utc::now() + delay),
            clear_delivery: true,
            ..StatusMutation::default()
        };

        self.update_status(event_id, project_id, from_statuses, failure_status, mutation)
            .await
    }

    /// La generación terminó: adjunta el payload y el tiempo de fase.
    pub async fn to_triples_generated(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
        payload: ZippedEventPayload,
        processing_time_millis: i64,
    ) -> Result<StatusUpdateOutcome, StoreError> {
        let mutation = StatusMutation {
            set_payload: Some(payload),
            clear_message: true,
            clear_delivery: true,
            append_processing_time: Some(ProcessingTime {
                status: EventStatus::TriplesGenerated,
                duration_millis: processing_time_millis,
            }),
            ..StatusMutation::default()
        };

        self.update_status(
            event_id,
            project_id,
            &[EventStatus::GeneratingTriples],
            EventStatus::TriplesGenerated,
            mutation,
        )
        .await
    }

    /// Re-proceso dirigido de un evento concreto hacia NEW.
    pub async fn to_new(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
    ) -> Result<StatusUpdateOutcome, StoreError> {
        let mutation = StatusMutation {
            clear_message: true,
            delete_payload: true,
            set_execution_date: Some(Utc::now()),
            clear_delivery: true,
            ..StatusMutation::default()
        };

        self.update_status(
            event_id,
            project_id,
            &[
                EventStatus::GeneratingTriples,
                EventStatus::TriplesGenerated,
                EventStatus::GenerationRecoverableFailure,
                EventStatus::TransformationRecoverableFailure,
                EventStatus::Skipped,
            ],
            EventStatus::New,
            mutation,
        )
        .await
    }

    /// Cesión limpia del generador: el evento vuelve a NEW.
    pub async fn rollback_to_new(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
    ) -> Result<StatusUpdateOutcome, StoreError> {
        let mutation = StatusMutation {
            clear_message: true,
            set_execution_date: Some(Utc::now()),
            clear_delivery: true,
            ..StatusMutation::default()
        };

        self.update_status(
            event_id,
            project_id,
            &[EventStatus::GeneratingTriples],
            EventStatus::New,
            mutation,
        )
        .await
    }

    /// Cesión limpia del transformador: el payload se conserva.
    pub async fn rollback_to_triples_generated(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
    ) -> Result<StatusUpdateOutcome, StoreError> {
        let mutation = StatusMutation {
            clear_message: true,
            set_execution_date: Some(Utc::now()),
            clear_delivery: true,
            ..StatusMutation::default()
        };

        self.update_status(
            event_id,
            project_id,
            &[EventStatus::TransformingTriples],
            EventStatus::TriplesGenerated,
            mutation,
        )
        .await
    }

    /// Marca el evento para el ciclo de borrado.
    pub async fn to_awaiting_deletion(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
    ) -> Result<StatusUpdateOutcome, StoreError> {
        let mutation = StatusMutation {
            clear_message: true,
            delete_payload: true,
            set_execution_date: Some(Utc::now()),
            clear_delivery: true,
            ..StatusMutation::default()
        };

        self.update_status(
            event_id,
            project_id,
            &[
                EventStatus::New,
                EventStatus::GeneratingTriples,
                EventStatus::TriplesGenerated,
                EventStatus::TransformingTriples,
                EventStatus::TriplesStore,
                EventStatus::Skipped,
                EventStatus::GenerationRecoverableFailure,
                EventStatus::GenerationNonRecoverableFailure,
                EventStatus::TransformationRecoverableFailure,
                EventStatus::TransformationNonRecoverableFailure,
            ],
            EventStatus::AwaitingDeletion,
            mutation,
        )
        .await
    }

    /// Transición masiva post-limpieza: todo evento no terminal vuelve a NEW.
    #[instrument(skip(self))]
    pub async fn project_events_to_new(&self, project_id: ProjectId) -> Result<u64, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        let rearmed_rows = ledger_transaction
            .execute(
                sql_registry::PROJECT_EVENTS_TO_NEW,
                params![project_id.value(), encode_timestamp(Utc::now())],
            )
            .await?;

        ledger_transaction
            .execute(sql_registry::PURGE_PROJECT_DELIVERIES, params![project_id.value()])
            .await?;

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        info!("♻️  [LEDGER]: Project [{}] rearmed {} events to NEW.", project_id, rearmed_rows);
        Ok(rearmed_rows)
    }

    /// Re-encola la transformación de los eventos certificados con payload.
    pub async fn redo_project_transformation(
        &self,
        project_id: ProjectId,
    ) -> Result<u64, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let requeued_rows = ledger_connection
            .execute(
                sql_registry::REDO_PROJECT_TRANSFORMATION,
                params![project_id.value(), encode_timestamp(Utc::now())],
            )
            .await?;

        Ok(requeued_rows)
    }

    // ------------------------------------------------------------------
    // ESTRATO DE SELECCIÓN Y RECLAMO (PRODUCTORES)
    // ------------------------------------------------------------------

    pub async fn find_generation_candidates(
        &self,
        eligibility_horizon: DateTime<Utc>,
        candidate_limit: i64,
    ) -> Result<Vec<ProjectCandidate>, StoreError> {
        self.collect_candidates(
            sql_registry::FIND_GENERATION_CANDIDATES,
            eligibility_horizon,
            candidate_limit,
        )
        .await
    }

    pub async fn find_transformation_candidates(
        &self,
        eligibility_horizon: DateTime<Utc>,
        candidate_limit: i64,
    ) -> Result<Vec<ProjectCandidate>, StoreError> {
        self.collect_candidates(
            sql_registry::FIND_TRANSFORMATION_CANDIDATES,
            eligibility_horizon,
            candidate_limit,
        )
        .await
    }

    async fn collect_candidates(
        &self,
        candidate_statement: &str,
        eligibility_horizon: DateTime<Utc>,
        candidate_limit: i64,
    ) -> Result<Vec<ProjectCandidate>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut candidate_rows = ledger_connection
            .query(
                candidate_statement,
                params![encode_timestamp(eligibility_horizon), candidate_limit],
            )
            .await?;

        let mut candidates = Vec::new();
        while let Some(candidate_row) = candidate_rows.next().await? {
            let latest_eligible_label: String = candidate_row.get(2)?;
            candidates.push(ProjectCandidate {
                project_id: ProjectId(candidate_row.get(0)?),
                slug: ProjectSlug(candidate_row.get(1)?),
                latest_eligible_date: decode_timestamp(&latest_eligible_label)?,
                occupancy: candidate_row.get(3)?,
            });
        }

        Ok(candidates)
    }

    /**
     * Reclama el evento elegible más reciente del proyecto para la fase
     * de generación. Una carrera perdida devuelve `None` sin fallo.
     */
    #[instrument(skip(self, project_slug))]
    pub async fn claim_for_generation(
        &self,
        project_id: ProjectId,
        project_slug: &ProjectSlug,
        local_now: DateTime<Utc>,
    ) -> Result<Option<DispatchableEvent>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        let mut eligible_rows = ledger_transaction
            .query(
                sql_registry::FIND_NEWEST_GENERATION_EVENT,
                params![project_id.value(), encode_timestamp(local_now)],
            )
            .await?;

        let Some(eligible_row) = eligible_rows.next().await? else {
            return Ok(None);
        };

        let event_id = EventId(eligible_row.get(0)?);
        let event_date_label: String = eligible_row.get(1)?;

        let claimed_rows = ledger_transaction
            .execute(
                sql_registry::CLAIM_FOR_GENERATION,
                params![
                    event_id.as_str(),
                    project_id.value(),
                    encode_timestamp(local_now)
                ],
            )
            .await?;

        if claimed_rows == 0 {
            // CAS perdido: otro productor avanzó el estado bajo nosotros.
            return Ok(None);
        }

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        Ok(Some(DispatchableEvent {
            event_id,
            project: ProjectReference {
                id: project_id,
                slug: project_slug.clone(),
            },
            event_date: decode_timestamp(&event_date_label)?,
            payload: None,
        }))
    }

    /// Reclamo análogo para la fase de transformación; carga el payload.
    #[instrument(skip(self, project_slug))]
    pub async fn claim_for_transformation(
        &self,
        project_id: ProjectId,
        project_slug: &ProjectSlug,
        local_now: DateTime<Utc>,
    ) -> Result<Option<DispatchableEvent>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        let mut eligible_rows = ledger_transaction
            .query(
                sql_registry::FIND_NEWEST_TRANSFORMATION_EVENT,
                params![project_id.value(), encode_timestamp(local_now)],
            )
            .await?;

        let Some(eligible_row) = eligible_rows.next().await? else {
            return Ok(None);
        };

        let event_id = EventId(eligible_row.get(0)?);
        let event_date_label: String = eligible_row.get(1)?;
        let payload_bytes: Option<Vec<u8>> = eligible_row.get(2)?;

        let claimed_rows = ledger_transaction
            .execute(
                sql_registry::CLAIM_FOR_TRANSFORMATION,
                params![
                    event_id.as_str(),
                    project_id.value(),
                    encode_timestamp(local_now)
                ],
            )
            .await?;

        if claimed_rows == 0 {
            return Ok(None);
        }

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        Ok(Some(DispatchableEvent {
            event_id,
            project: ProjectReference {
                id: project_id,
                slug: project_slug.clone(),
            },
            event_date: decode_timestamp(&event_date_label)?,
            payload: payload_bytes.map(ZippedEventPayload::from_compressed),
        }))
    }

    /// Reclama el evento de borrado más antiguo de un proyecto ocioso.
    #[instrument(skip(self))]
    pub async fn claim_for_deletion(
        &self,
        local_now: DateTime<Utc>,
    ) -> Result<Option<DispatchableEvent>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        let mut deletion_rows = ledger_transaction
            .query(
                sql_registry::FIND_OLDEST_DELETION_EVENT,
                params![encode_timestamp(local_now)],
            )
            .await?;

        let Some(deletion_row) = deletion_rows.next().await? else {
            return Ok(None);
        };

        let event_id = EventId(deletion_row.get(0)?);
        let event_date_label: String = deletion_row.get(1)?;
        let project_id = ProjectId(deletion_row.get(2)?);
        let project_slug = ProjectSlug(deletion_row.get(3)?);

        let claimed_rows = ledger_transaction
            .execute(
                sql_registry::CLAIM_FOR_DELETION,
                params![
                    event_id.as_str(),
                    project_id.value(),
                    encode_timestamp(local_now)
                ],
            )
            .await?;

        if claimed_rows == 0 {
            return Ok(None);
        }

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        Ok(Some(DispatchableEvent {
            event_id,
            project: ProjectReference {
                id: project_id,
                slug: project_slug,
            },
            event_date: decode_timestamp(&event_date_label)?,
            payload: None,
        }))
    }

    // ------------------------------------------------------------------
    // ESTRATO DE CAZA DE ZOMBIES
    // ------------------------------------------------------------------

    /**
     * Localiza eventos en procesamiento sin dueño verificable: entrega
     * ausente, suscriptor desaparecido, o ejecución estancada más allá
     * del periodo de gracia.
     */
    pub async fn find_zombie_events(
        &self,
        local_now: DateTime<Utc>,
        grace_period: Duration,
        scan_limit: i64,
    ) -> Result<Vec<ZombieEvent>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let grace_cutoff = local_now - grace_period;

        let mut zombie_rows = ledger_connection
            .query(
                sql_registry::FIND_ZOMBIE_EVENTS,
                params![encode_timestamp(grace_cutoff), scan_limit],
            )
            .await?;

        let mut zombies = Vec::new();
        while let Some(zombie_row) = zombie_rows.next().await? {
            let status_label: String = zombie_row.get(2)?;
            let status = EventStatus::from_wire(&status_label).ok_or_else(|| {
                StoreError::MappingError(format!("unknown status '{status_label}' in ledger"))
            })?;

            zombies.push(ZombieEvent {
                event_id: EventId(zombie_row.get(0)?),
                project_id: ProjectId(zombie_row.get(1)?),
                status,
            });
        }

        Ok(zombies)
    }

    /**
     * Rescata un zombie: siembra el centinela, retrocede al estado
     * predecesor y purga la entrega huérfana. La guardia sobre el
     * mensaje impide rescates repetidos.
     */
    #[instrument(skip(self, zombie))]
    pub async fn chase_zombie(
        &self,
        zombie: &ZombieEvent,
        local_now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(rollback_status) = zombie.status.rollback_target() else {
            return Ok(false);
        };

        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        let rescued_rows = ledger_transaction
            .execute(
                sql_registry::CHASE_ZOMBIE,
                params![
                    zombie.event_id.as_str(),
                    zombie.project_id.value(),
                    rollback_status.as_str(),
                    encode_timestamp(local_now),
                    zombie.status.as_str()
                ],
            )
            .await?;

        if rescued_rows == 0 {
            return Ok(false);
        }

        ledger_transaction
            .execute(
                sql_registry::DELETE_EVENT_DELIVERY,
                params![zombie.event_id.as_str(), zombie.project_id.value()],
            )
            .await?;

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        warn!(
            "💀 [LEDGER]: Zombie event [{}] rescued back to [{}].",
            zombie.event_id, rollback_status
        );
        Ok(true)
    }

    // ------------------------------------------------------------------
    // ESTRATO DE LIMPIEZA DE PROYECTO
    // ------------------------------------------------------------------

    /// Borrado en cascada: tiempos, entregas, eventos, watermarks y proyecto.
    #[instrument(skip(self))]
    pub async fn delete_project(&self, project_id: ProjectId) -> Result<(), StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        for cascade_statement in [
            sql_registry::DELETE_PROJECT_PROCESSING_TIMES,
            sql_registry::PURGE_PROJECT_DELIVERIES,
            sql_registry::DELETE_PROJECT_EVENTS,
            sql_registry::DELETE_PROJECT_SYNC_TIMES,
            sql_registry::DELETE_PROJECT_ROW,
        ] {
            ledger_transaction
                .execute(cascade_statement, params![project_id.value()])
                .await?;
        }

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        info!("🧹 [LEDGER]: Project [{}] purged from the event ledger.", project_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // ESTRATO DE CENSO (GAUGES)
    // ------------------------------------------------------------------

    /// Censo global (slug, estado, conteo) para reconstruir los gauges.
    pub async fn status_census(
        &self,
    ) -> Result<Vec<(ProjectSlug, EventStatus, i64)>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let mut census_rows = ledger_connection
            .query(sql_registry::STATUS_CENSUS, ())
            .await?;
        Self::collect_census(&mut census_rows).await
    }

    /// Censo de un solo proyecto (refresco tras promociones en lote).
    pub async fn project_status_census(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<(ProjectSlug, EventStatus, i64)>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let mut census_rows = ledger_connection
            .query(sql_registry::PROJECT_STATUS_CENSUS, params![project_id.value()])
            .await?;
        Self::collect_census(&mut census_rows).await
    }

    async fn collect_census(
        census_rows: &mut libsql::Rows,
    ) -> Result<Vec<(ProjectSlug, EventStatus, i64)>, StoreError> {
        let mut census = Vec::new();
        while let Some(census_row) = census_rows.next().await? {
            let status_label: String = census_row.get(1)?;
            let Some(status) = EventStatus::from_wire(&status_label) else {
                continue;
            };
            census.push((ProjectSlug(census_row.get(0)?), status, census_row.get(2)?));
        }
        Ok(census)
    }

    // ------------------------------------------------------------------
    // HIDRATACIÓN
    // ------------------------------------------------------------------

    fn hydrate_event(event_row: &Row) -> Result<Event, StoreError> {
        let status_label: String = event_row.get(3)?;
        let status = EventStatus::from_wire(&status_label).ok_or_else(|| {
            StoreError::MappingError(format!("unknown status '{status_label}' in ledger"))
        })?;

        let event_date_label: String = event_row.get(4)?;
        let created_date_label: String = event_row.get(5)?;
        let execution_date_label: String = event_row.get(6)?;
        let batch_date_label: String = event_row.get(7)?;
        let message: Option<String> = event_row.get(8)?;
        let payload_bytes: Option<Vec<u8>> = event_row.get(9)?;

        let created_date = decode_timestamp(&created_date_label)?;

        Ok(Event {
            event_id: EventId(event_row.get(0)?),
            project_id: ProjectId(event_row.get(1)?),
            project_slug: ProjectSlug(event_row.get(2)?),
            status,
            event_date: EventDate(decode_timestamp(&event_date_label)?),
            created_date,
            execution_date: ExecutionDate(decode_timestamp(&execution_date_label)?),
            batch_date: BatchDate(decode_timestamp(&batch_date_label)?),
            message: message.and_then(EventMessage::new),
            payload: payload_bytes.map(ZippedEventPayload::from_compressed),
            processing_times: Vec::new(),
        })
    }

    async fn load_processing_times(
        &self,
        ledger_connection: &Connection,
        event_id: &EventId,
        project_id: ProjectId,
    ) -> Result<Vec<ProcessingTime>, StoreError> {
        let mut time_rows = ledger_connection
            .query(
                sql_registry::FIND_PROCESSING_TIMES,
                params![event_id.as_str(), project_id.value()],
            )
            .await?;

        let mut processing_times = Vec::new();
        while let Some(time_row) = time_rows.next().await? {
            let status_label: String = time_row.get(0)?;
            let status = EventStatus::from_wire(&status_label).ok_or_else(|| {
                StoreError::MappingError(format!("unknown status '{status_label}' in ledger"))
            })?;

            processing_times.push(ProcessingTime {
                status,
                duration_millis: time_row.get(1)?,
            });
        }

        Ok(processing_times)
    }
}
