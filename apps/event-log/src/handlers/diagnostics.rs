// [apps/event-log/src/handlers/diagnostics.rs]
/*!
 * =================================================================
 * APARATO: DIAGNOSTICS HANDLER (V8.0 - PANOPTICON WINDOW)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: VENTANA OPERACIONAL DEL FABRIC
 * =================================================================
 */

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub struct DiagnosticsHandler;

impl DiagnosticsHandler {
    /// Endpoint: GET /status — gauges por proyecto y censo de suscriptores.
    pub async fn handle_status_window(
        State(application_state): State<AppState>,
    ) -> impl IntoResponse {
        let project_count = application_state
            .project_repository
            .count_projects()
            .await
            .unwrap_or(-1);

        (
            StatusCode::OK,
            Json(json!({
                "projects": project_count,
                "gauges": application_state.status_gauges.snapshot(),
                "subscribers": application_state.subscriber_registry.snapshot(),
            })),
        )
    }
}
