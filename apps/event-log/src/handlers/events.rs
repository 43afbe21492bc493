// [apps/event-log/src/handlers/events.rs]
/*!
 * =================================================================
 * APARATO: EVENT INGESTION HANDLER (V9.0 - SINGLE DOOR)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PUERTA ÚNICA DE INGESTA DEL EVENT LOG
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE DOOR: Commit-sync, cambios de estado y reportes de
 *    migración entran por POST /events, enrutados por `categoryName`.
 * 2. DUAL TRANSPORT: JSON plano o multipart (parte `event` + parte
 *    `payload` gzip para ToTriplesGenerated).
 * 3. SEMANTIC CODES: 400 malformado, 404 evento ausente, 409 conflicto
 *    de estado o custodia, 202 aceptado.
 * =================================================================
 */

use crate::services::transition_executor::{TransitionExecutor, TransitionFault};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json, RequestExt,
};
use chrono::Utc;
use graphline_domain_models::{
    CommitSyncRequest, EventCategory, EventDate, EventStatus, MigrationRequestEnvelope, ProjectId,
    StatusChangeRequest, ZippedEventPayload,
};
use graphline_infra_db::{StoreError, UpsertOutcome};
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

pub struct EventIngestionHandler;

impl EventIngestionHandler {
    /**
     * Endpoint: POST /events
     *
     * Acepta JSON plano o multipart; enruta por `categoryName`.
     */
    #[instrument(skip(application_state, request))]
    pub async fn handle_event_ingestion(
        State(application_state): State<AppState>,
        request: Request,
    ) -> Response {
        let is_multipart = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|content_type| content_type.to_str().ok())
            .is_some_and(|content_type| content_type.starts_with("multipart/form-data"));

        let (event_body, payload_part) = if is_multipart {
            match Self::read_multipart(request).await {
                Ok(parts) => parts,
                Err(malformed_response) => return malformed_response,
            }
        } else {
            match request.extract::<Json<serde_json::Value>, _>().await {
                Ok(Json(event_body)) => (event_body, None),
                Err(_) => {
                    return fault_response(StatusCode::BAD_REQUEST, "malformed JSON body");
                }
            }
        };

        Self::route_event(application_state, event_body, payload_part).await
    }

    /// Lee las partes `event` (JSON) y `payload` (bytes gzip).
    async fn read_multipart(
        request: Request,
    ) -> Result<(serde_json::Value, Option<ZippedEventPayload>), Response> {
        let mut multipart = match request.extract::<Multipart, _>().await {
            Ok(multipart) => multipart,
            Err(_) => {
                return Err(fault_response(StatusCode::BAD_REQUEST, "malformed multipart body"))
            }
        };

        let mut event_body: Option<serde_json::Value> = None;
        let mut payload_part: Option<ZippedEventPayload> = None;

        while let Ok(Some(part)) = multipart.next_field().await {
            match part.name() {
                Some("event") => {
                    let raw_text = part.text().await.map_err(|_| {
                        fault_response(StatusCode::BAD_REQUEST, "unreadable event part")
                    })?;
                    let decoded = serde_json::from_str(&raw_text).map_err(|_| {
                        fault_response(StatusCode::BAD_REQUEST, "event part is not valid JSON")
                    })?;
                    event_body = Some(decoded);
                }
                Some("payload") => {
                    let raw_bytes = part.bytes().await.map_err(|_| {
                        fault_response(StatusCode::BAD_REQUEST, "unreadable payload part")
                    })?;
                    payload_part = Some(ZippedEventPayload::from_compressed(raw_bytes.to_vec()));
                }
                _ => {}
            }
        }

        match event_body {
            Some(event_body) => Ok((event_body, payload_part)),
            None => Err(fault_response(StatusCode::BAD_REQUEST, "missing event part")),
        }
    }

    /// Enrutamiento por categoría de la puerta única.
    async fn route_event(
        application_state: AppState,
        event_body: serde_json::Value,
        payload_part: Option<ZippedEventPayload>,
    ) -> Response {
        let Some(category_label) = event_body.get("categoryName").and_then(|v| v.as_str()) else {
            return fault_response(StatusCode::BAD_REQUEST, "missing categoryName");
        };

        let Some(category) = EventCategory::from_wire(category_label) else {
            warn!("❌ [INGESTION]: Unknown category [{}] rejected.", category_label);
            return fault_response(StatusCode::BAD_REQUEST, "unknown category name");
        };

        match category {
            EventCategory::CommitSyncRequest => {
                Self::ingest_commit_sync(application_state, event_body).await
            }
            EventCategory::EventsStatusChange => {
                Self::ingest_status_change(application_state, event_body, payload_part).await
            }
            EventCategory::TsMigrationRequest => {
                Self::ingest_migration_report(application_state, event_body).await
            }
            _ => fault_response(
                StatusCode::BAD_REQUEST,
                "category is producer-driven and not ingestible",
            ),
        }
    }

    /// COMMIT_SYNC_REQUEST: inyección del Webhook Gateway.
    async fn ingest_commit_sync(
        application_state: AppState,
        event_body: serde_json::Value,
    ) -> Response {
        let commit_sync: CommitSyncRequest = match serde_json::from_value(event_body) {
            Ok(commit_sync) => commit_sync,
            Err(_) => return fault_response(StatusCode::BAD_REQUEST, "malformed commit sync request"),
        };

        let local_now = Utc::now();
        let event_date = EventDate::clamped(commit_sync.occurred_at, local_now);

        match application_state
            .event_repository
            .upsert_event(&commit_sync.id, &commit_sync.project, event_date)
            .await
        {
            Ok(UpsertOutcome::Created) => {
                application_state
                    .status_gauges
                    .increment(&commit_sync.project.slug, EventStatus::New);
                info!(
                    "📥 [INGESTION]: Event [{}] created for project [{}].",
                    commit_sync.id, commit_sync.project.slug
                );
                StatusCode::ACCEPTED.into_response()
            }
            Ok(UpsertOutcome::Existed) => {
                if let Ok(project_census) = application_state
                    .event_repository
                    .project_status_census(commit_sync.project.id)
                    .await
                {
                    application_state
                        .status_gauges
                        .resync_project(&commit_sync.project.slug, project_census);
                }
                StatusCode::ACCEPTED.into_response()
            }
            Ok(UpsertOutcome::Skipped) => StatusCode::ACCEPTED.into_response(),
            Err(ingestion_fault) => store_fault_response(&ingestion_fault),
        }
    }

    /// EVENTS_STATUS_CHANGE: canal de retorno de los suscriptores.
    async fn ingest_status_change(
        application_state: AppState,
        event_body: serde_json::Value,
        payload_part: Option<ZippedEventPayload>,
    ) -> Response {
        let status_change: StatusChangeRequest = match serde_json::from_value(event_body) {
            Ok(status_change) => status_change,
            Err(decode_fault) => {
                warn!("❌ [INGESTION]: Status change rejected: {}", decode_fault);
                return fault_response(StatusCode::BAD_REQUEST, "malformed status change request");
            }
        };

        let executor = TransitionExecutor::new(application_state);
        match executor.execute(&status_change, payload_part).await {
            Ok(()) => StatusCode::ACCEPTED.into_response(),
            Err(TransitionFault::EventNotFound) => {
                fault_response(StatusCode::NOT_FOUND, "event not found")
            }
            Err(TransitionFault::StateConflict) => {
                fault_response(StatusCode::CONFLICT, "status transition conflict")
            }
            Err(TransitionFault::CustodyViolation) => {
                fault_response(StatusCode::CONFLICT, "no delivery records custody of this event")
            }
            Err(TransitionFault::MalformedRequest(reason)) => {
                fault_response(StatusCode::BAD_REQUEST, reason)
            }
            Err(TransitionFault::Store(store_fault)) => store_fault_response(&store_fault),
        }
    }

    /// TS_MIGRATION_REQUEST: reporte de desenlace de migración.
    async fn ingest_migration_report(
        application_state: AppState,
        event_body: serde_json::Value,
    ) -> Response {
        let migration_envelope: MigrationRequestEnvelope = match serde_json::from_value(event_body)
        {
            Ok(migration_envelope) => migration_envelope,
            Err(_) => {
                return fault_response(StatusCode::BAD_REQUEST, "malformed migration envelope")
            }
        };

        match application_state
            .migration_repository
            .record_outcome(&migration_envelope)
            .await
        {
            Ok(true) => StatusCode::ACCEPTED.into_response(),
            Ok(false) => fault_response(StatusCode::NOT_FOUND, "migration row not found"),
            Err(migration_fault) => store_fault_response(&migration_fault),
        }
    }

    /**
     * Endpoint: GET /events?project-id=N
     *
     * Enumeración para inspección y recuperación de fallos parciales.
     */
    #[instrument(skip(application_state, query_params))]
    pub async fn handle_event_enumeration(
        State(application_state): State<AppState>,
        Query(query_params): Query<HashMap<String, String>>,
    ) -> Response {
        let Some(project_id) = query_params
            .get("project-id")
            .and_then(|raw| raw.parse::<i64>().ok())
        else {
            return fault_response(StatusCode::BAD_REQUEST, "missing or malformed project-id");
        };

        match application_state
            .event_repository
            .find_project_events(ProjectId(project_id))
            .await
        {
            Ok(project_events) => {
                let enumeration: Vec<serde_json::Value> = project_events
                    .iter()
                    .map(|event| {
                        json!({
                            "id": event.event_id.as_str(),
                            "project": {
                                "id": event.project_id.value(),
                                "slug": event.project_slug.as_str(),
                            },
                            "status": event.status.as_str(),
                            "eventDate": event.event_date.instant().to_rfc3339(),
                            "executionDate": event.execution_date.instant().to_rfc3339(),
                            "message": event.message.as_ref().map(|m| m.as_str()),
                            "hasPayload": event.payload.is_some(),
                            "processingTimes": event.processing_times,
                        })
                    })
                    .collect();

                (StatusCode::OK, Json(json!(enumeration))).into_response()
            }
            Err(enumeration_fault) => store_fault_response(&enumeration_fault),
        }
    }
}

/// Respuesta de fallo con cuerpo JSON `{message}`.
fn fault_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn store_fault_response(store_fault: &StoreError) -> Response {
    let status = match store_fault {
        StoreError::DeadlockDetected => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "message": store_fault.to_string() }))).into_response()
}
