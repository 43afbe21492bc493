// [libs/infra/event-log-client/src/client.rs]
/*!
 * =================================================================
 * APARATO: EVENT LOG UPLINK (V7.0 - MULTIPART READY)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: TÚNEL HTTP HACIA EL EVENT LOG
 *
 * VISION HIPER-HOLÍSTICA:
 * Implementa el túnel de comunicación asíncrono entre los servicios
 * perimetrales (Webhook Gateway, workers suscriptores) y el Event Log.
 * Toda operación respeta el timeout soberano de 30 segundos.
 * =================================================================
 */

use crate::errors::ClientError;
use graphline_domain_models::{
    CommitSyncRequest, EventCategory, MigrationRequestEnvelope, StatusChangeRequest,
    SubscriptionPayload, ZippedEventPayload,
};
use reqwest::{multipart, Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Timeout soberano de todas las operaciones del túnel.
const UPLINK_TIMEOUT_SECONDS: u64 = 30;

pub struct EventLogClient {
    network_session_client: Client,
    event_log_base_endpoint: String,
}

impl EventLogClient {
    /**
     * Inicializa el túnel hacia el Event Log.
     *
     * # Panics:
     * Si el builder de reqwest colapsa (configuración TLS corrupta).
     */
    #[must_use]
    pub fn new(event_log_base_url: String) -> Self {
        Self {
            network_session_client: Client::builder()
                .timeout(Duration::from_secs(UPLINK_TIMEOUT_SECONDS))
                .user_agent("Graphline-EventLog-Client/V7")
                .build()
                .expect("FATAL: Client initialization failed."),
            event_log_base_endpoint: event_log_base_url.trim_end_matches('/').to_string(),
        }
    }

    /**
     * Inyecta una solicitud de sincronización de commit en el log.
     *
     * # Errors:
     * - `ServerRejection`: Si el log no responde `202 Accepted`.
     */
    #[instrument(skip(self, request), fields(project = %request.project.slug))]
    pub async fn post_commit_sync_request(
        &self,
        request: &CommitSyncRequest,
    ) -> Result<(), ClientError> {
        let envelope_body = Self::tag_with_category(EventCategory::CommitSyncRequest, request)?;
        self.post_event_body(&envelope_body).await
    }

    /**
     * Reporta un cambio de estado; `ToTriplesGenerated` adjunta el
     * payload gzip como parte multipart.
     */
    #[instrument(skip(self, request, payload))]
    pub async fn post_status_change(
        &self,
        request: &StatusChangeRequest,
        payload: Option<&ZippedEventPayload>,
    ) -> Result<(), ClientError> {
        let envelope_body = Self::tag_with_category(EventCategory::EventsStatusChange, request)?;
        let target_url = format!("{}/events", self.event_log_base_endpoint);

        let network_response = match payload {
            None => {
                self.network_session_client
                    .post(&target_url)
                    .json(&envelope_body)
                    .send()
                    .await?
            }
            Some(zipped_payload) => {
                let event_part = multipart::Part::text(
                    serde_json::to_string(&envelope_body)
                        .map_err(|fault| ClientError::EncodingFault(fault.to_string()))?,
                )
                .mime_str("application/json")
                .map_err(|fault| ClientError::EncodingFault(fault.to_string()))?;

                let payload_part = multipart::Part::bytes(zipped_payload.as_bytes().to_vec())
                    .file_name("payload.gz")
                    .mime_str("application/gzip")
                    .map_err(|fault| ClientError::EncodingFault(fault.to_string()))?;

                let multipart_form = multipart::Form::new()
                    .part("event", event_part)
                    .part("payload", payload_part);

                self.network_session_client
                    .post(&target_url)
                    .multipart(multipart_form)
                    .send()
                    .await?
            }
        };

        Self::expect_accepted(network_response.status())
    }

    /// Reporta el desenlace de una migración del triples store.
    #[instrument(skip(self, envelope))]
    pub async fn post_migration_outcome(
        &self,
        envelope: &MigrationRequestEnvelope,
    ) -> Result<(), ClientError> {
        let envelope_body = Self::tag_with_category(EventCategory::TsMigrationRequest, envelope)?;
        self.post_event_body(&envelope_body).await
    }

    /**
     * Alta o renovación de la suscripción a una categoría.
     *
     * # Errors:
     * - `ServerRejection`: Categoría desconocida o versión en blanco.
     */
    #[instrument(skip(self, payload), fields(category = %payload.category_name))]
    pub async fn subscribe(&self, payload: &SubscriptionPayload) -> Result<(), ClientError> {
        let target_url = format!("{}/subscriptions", self.event_log_base_endpoint);

        let network_response = self
            .network_session_client
            .post(&target_url)
            .json(payload)
            .send()
            .await?;

        Self::expect_accepted(network_response.status())
    }

    async fn post_event_body(&self, envelope_body: &serde_json::Value) -> Result<(), ClientError> {
        let target_url = format!("{}/events", self.event_log_base_endpoint);

        let network_response = self
            .network_session_client
            .post(&target_url)
            .json(envelope_body)
            .send()
            .await?;

        debug!("📡 [UPLINK]: Event body dispatched -> HTTP_{}", network_response.status());
        Self::expect_accepted(network_response.status())
    }

    /// Etiqueta el cuerpo con su `categoryName` de enrutamiento.
    fn tag_with_category<T: Serialize>(
        category: EventCategory,
        body: &T,
    ) -> Result<serde_json::Value, ClientError> {
        let mut tagged_body = serde_json::to_value(body)
            .map_err(|fault| ClientError::EncodingFault(fault.to_string()))?;

        let serde_json::Value::Object(ref mut body_map) = tagged_body else {
            return Err(ClientError::EncodingFault("event body must be an object".into()));
        };

        body_map.insert(
            "categoryName".to_string(),
            serde_json::Value::String(category.as_str().to_string()),
        );

        Ok(tagged_body)
    }

    fn expect_accepted(status: StatusCode) -> Result<(), ClientError> {
        if status == StatusCode::ACCEPTED {
            Ok(())
        } else {
            Err(ClientError::ServerRejection(status.as_u16()))
        }
    }
}
