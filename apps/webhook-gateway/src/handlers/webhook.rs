// [apps/webhook-gateway/src/handlers/webhook.rs]
/*!
 * =================================================================
 * APARATO: PUSH EVENT HANDLER (V6.0 - ZERO LEAKAGE)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: VALIDACIÓN Y RELEVO DE NOTIFICACIONES PUSH
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TOKEN FIRST: La cabecera se valida antes de tocar el cuerpo; un
 *    token inválido muere con 401 sin revelar nada del payload.
 * 2. FIRE AND ACK: La respuesta 202 no espera la persistencia; el
 *    relevo hacia el Event Log ocurre en una tarea de fondo con
 *    reintentos acotados.
 * 3. ZERO LEAKAGE: El token jamás se registra ni se devuelve.
 * =================================================================
 */

use crate::services::commit_sync_relay::CommitSyncRelayService;
use crate::state::GatewayState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use graphline_core_token_vault::SealedHookToken;
use graphline_domain_models::{CommitSyncRequest, PushEventPayload};
use serde_json::json;
use tracing::{info, instrument, warn};

/// Cabecera del token opaco emitido para cada hook del Forge.
const FORGE_TOKEN_HEADER: &str = "X-Gitlab-Token";

pub struct PushEventHandler;

impl PushEventHandler {
    /**
     * Endpoint: POST /webhooks/events
     *
     * # Status codes:
     * - `202` aceptado (la persistencia ocurre en segundo plano),
     * - `400` cuerpo malformado,
     * - `401` token inválido o proyecto discordante.
     */
    #[instrument(skip(gateway_state, request_headers, raw_body))]
    pub async fn handle_push_event(
        State(gateway_state): State<GatewayState>,
        request_headers: HeaderMap,
        raw_body: Bytes,
    ) -> Response {
        // 1. APERTURA DEL TOKEN (la cabecera manda; el cuerpo espera).
        let Some(sealed_token) = request_headers
            .get(FORGE_TOKEN_HEADER)
            .and_then(|header_value| header_value.to_str().ok())
            .map(SealedHookToken::from_header_value)
        else {
            warn!("❌ [WEBHOOK]: Push rejected: token header absent.");
            return StatusCode::UNAUTHORIZED.into_response();
        };

        let token_claims = match gateway_state.token_vault.unseal(&sealed_token) {
            Ok(token_claims) => token_claims,
            Err(_) => {
                warn!("❌ [WEBHOOK]: Push rejected: token seal verification failed.");
                return StatusCode::UNAUTHORIZED.into_response();
            }
        };

        // 2. DECODIFICACIÓN DEL CUERPO.
        let push_payload: PushEventPayload = match serde_json::from_slice(&raw_body) {
            Ok(push_payload) => push_payload,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": "malformed push payload" })),
                )
                    .into_response();
            }
        };

        // 3. PARIDAD TOKEN <-> CUERPO.
        if push_payload.project.id != token_claims.project_id {
            warn!(
                "❌ [WEBHOOK]: Project mismatch: token project differs from body project [{}].",
                push_payload.project.id
            );
            return StatusCode::UNAUTHORIZED.into_response();
        }

        // 4. RELEVO EN SEGUNDO PLANO; ACK INMEDIATO.
        let commit_sync = CommitSyncRequest::from_push(&push_payload, Utc::now());
        let relay = CommitSyncRelayService::new(gateway_state.event_log_client.clone());
        tokio::spawn(async move { relay.publish_with_retries(commit_sync).await });

        info!(
            "📥 [WEBHOOK]: Push accepted for project [{}] (commit {}).",
            push_payload.project.path_with_namespace, push_payload.after
        );

        StatusCode::ACCEPTED.into_response()
    }
}
