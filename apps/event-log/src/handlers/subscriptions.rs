// [apps/event-log/src/handlers/subscriptions.rs]
/*!
 * =================================================================
 * APARATO: SUBSCRIPTION HANDLER (V8.0 - IDEMPOTENT ENROLLMENT)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ALTA Y RENOVACIÓN DE SUSCRIPTORES
 *
 * # Logic:
 * El alta es idempotente: la renovación periódica re-envía el mismo
 * payload y solo refresca `last_seen`. Categorías desconocidas o
 * versiones en blanco mueren en la frontera con HTTP 400.
 * =================================================================
 */

use crate::state::AppState;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use graphline_domain_models::{EventCategory, SourceUrl, SubscriptionPayload};
use serde_json::json;
use tracing::{error, info, instrument, warn};

pub struct SubscriptionHandler;

impl SubscriptionHandler {
    /**
     * Endpoint: POST /subscriptions
     *
     * # Errors:
     * - `BAD_REQUEST`: Categoría desconocida, categoría sin pool de
     *   suscriptores, o versión de servicio en blanco.
     * - `INTERNAL_SERVER_ERROR`: Fallo del Ledger al sellar el alta.
     */
    #[instrument(skip(application_state, subscription_payload), fields(category = %subscription_payload.category_name))]
    pub async fn handle_subscription(
        State(application_state): State<AppState>,
        Json(subscription_payload): Json<SubscriptionPayload>,
    ) -> impl IntoResponse {
        // 1. VALIDACIÓN DE CATÁLOGO.
        let Some(category) = EventCategory::from_wire(&subscription_payload.category_name) else {
            warn!(
                "❌ [SUBSCRIPTION]: Unknown category [{}] rejected.",
                subscription_payload.category_name
            );
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "unknown category name" })),
            )
                .into_response();
        };

        if !category.accepts_subscriptions() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "category does not accept subscriptions" })),
            )
                .into_response();
        }

        // 2. VALIDACIÓN DE VERSIÓN.
        if !subscription_payload.version_is_known() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "unknown subscriber version" })),
            )
                .into_response();
        }

        // 3. DERIVACIÓN DEL HOST FÍSICO (source_url).
        let source_url = derive_source_url(subscription_payload.subscriber.url.as_str());

        // 4. SELLADO EN EL LEDGER + ESPEJO EN RAM.
        if let Err(enrollment_fault) = application_state
            .subscriber_repository
            .upsert(
                category,
                &subscription_payload.subscriber,
                &source_url,
                subscription_payload.capacity,
            )
            .await
        {
            error!("❌ [SUBSCRIPTION]: Ledger enrollment failed: {}", enrollment_fault);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": enrollment_fault.to_string() })),
            )
                .into_response();
        }

        application_state.subscriber_registry.upsert(
            category,
            &subscription_payload.subscriber,
            subscription_payload.capacity.map(i64::from),
        );

        // 5. ALTA PEREZOSA EN EL PROTOCOLO DE MIGRACIÓN.
        if category == EventCategory::TsMigrationRequest {
            if let Err(migration_fault) = application_state
                .migration_repository
                .register_subscriber_version(
                    &subscription_payload.subscriber.url,
                    &subscription_payload.subscriber.version,
                )
                .await
            {
                error!("❌ [SUBSCRIPTION]: Migration row enrollment failed: {}", migration_fault);
            }
        }

        info!(
            "🤝 [SUBSCRIPTION]: [{}] enrolled in [{}] (capacity {:?}).",
            subscription_payload.subscriber.url, category, subscription_payload.capacity
        );

        StatusCode::ACCEPTED.into_response()
    }
}

/// Extrae la raíz física `scheme://host[:port]` del endpoint del worker.
fn derive_source_url(subscriber_url: &str) -> SourceUrl {
    let physical_root = match subscriber_url.find("://") {
        Some(scheme_end) => {
            let authority_start = scheme_end + 3;
            match subscriber_url[authority_start..].find('/') {
                Some(path_start) => &subscriber_url[..authority_start + path_start],
                None => subscriber_url,
            }
        }
        None => subscriber_url,
    };

    SourceUrl(physical_root.to_string())
}
