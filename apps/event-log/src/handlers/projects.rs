// [apps/event-log/src/handlers/projects.rs]
/*!
 * =================================================================
 * APARATO: PROJECT ADMINISTRATION HANDLER (V8.0 - CASCADE PURGE)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: LIMPIEZA EXPLÍCITA DE PROYECTOS
 * =================================================================
 */

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use graphline_domain_models::ProjectId;
use serde_json::json;
use tracing::{error, info, instrument};

pub struct ProjectAdministrationHandler;

impl ProjectAdministrationHandler {
    /**
     * Endpoint: DELETE /projects/:id
     *
     * Purga en cascada: eventos, tiempos de fase, entregas, watermarks
     * y la fila del proyecto. Única vía de borrado físico de eventos.
     */
    #[instrument(skip(application_state))]
    pub async fn handle_project_purge(
        State(application_state): State<AppState>,
        Path(raw_project_id): Path<i64>,
    ) -> impl IntoResponse {
        let project_id = ProjectId(raw_project_id);

        // Resolución del slug antes de la purga (gauges).
        let project = match application_state.project_repository.find_by_id(project_id).await {
            Ok(Some(project)) => project,
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "message": "project not found" })),
                )
                    .into_response();
            }
            Err(lookup_fault) => {
                error!("❌ [PROJECT_PURGE]: Lookup failed: {}", lookup_fault);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": lookup_fault.to_string() })),
                )
                    .into_response();
            }
        };

        if let Err(purge_fault) = application_state
            .event_repository
            .delete_project(project_id)
            .await
        {
            error!("❌ [PROJECT_PURGE]: Cascade failed: {}", purge_fault);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": purge_fault.to_string() })),
            )
                .into_response();
        }

        application_state.status_gauges.remove_project(&project.slug);

        info!("🧹 [PROJECT_PURGE]: Project [{}] purged.", project.slug);
        StatusCode::ACCEPTED.into_response()
    }
}
