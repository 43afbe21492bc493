// [apps/event-log/src/services/dispatcher.rs]
/*!
 * =================================================================
 * APARATO: DISPATCH ORCHESTRATOR (V9.0 - CUSTODY FIRST)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: ENTREGA DE SOBRES A SUSCRIPTORES CON RASTRO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CUSTODY FIRST: La entrega se registra en el Ledger ANTES del
 *    POST; un colapso entre selección y envío deja rastro auditable
 *    que el segador de zombies sabe rescatar.
 * 2. SATURATION AWARE: 429/503 revierte el reclamo y pausa el canal;
 *    el evento vuelve a su estado predecesor intacto.
 * 3. LOST SUBSCRIBER PROTOCOL: Conectividad agotada (10 intentos,
 *    back-off lineal de 10s) elimina al suscriptor del censo; sus
 *    entregas pasan al dominio del segador.
 *
 * # Mathematical Proof (No Event Loss):
 * Todo camino de salida deja el evento en un estado recuperable: o el
 * suscriptor lo posee (delivery viva), o fue revertido al predecesor,
 * o quedó huérfano con rastro para el segador. No existe camino que
 * abandone un estado de procesamiento sin entrega ni rescate.
 * =================================================================
 */

use crate::services::producers::{
    CategoryProducer, DispatchAccountability, DispatchCandidate, DispatchRoute,
};
use crate::state::AppState;
use chrono::Utc;
use graphline_domain_models::{DeliveryId, MigrationRequestEnvelope, MigrationSubCategory};
use graphline_infra_db::StatusMutation;
use reqwest::{multipart, Client, StatusCode};
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

/// Cadencia del bucle de despacho.
const DISPATCH_TICK_SECONDS: u64 = 1;

/// Intentos máximos de conectividad antes de declarar suscriptor perdido.
const MAX_DELIVERY_ATTEMPTS: u32 = 10;

/// Back-off lineal entre intentos de conectividad.
const DELIVERY_RETRY_BACKOFF_SECONDS: u64 = 10;

/// Pausa del canal tras un rechazo por saturación (429/503).
const BUSY_SUBSCRIBER_PAUSE_SECONDS: u64 = 5;

/// Timeout del POST de despacho.
const DISPATCH_POST_TIMEOUT_SECONDS: u64 = 30;

pub struct DispatchOrchestrator {
    application_shared_state: AppState,
    category_producer: CategoryProducer,
    network_session_client: Client,
}

impl DispatchOrchestrator {
    #[must_use]
    pub fn new(application_state: AppState, category_producer: CategoryProducer) -> Self {
        Self {
            application_shared_state: application_state,
            category_producer,
            network_session_client: Client::builder()
                .timeout(Duration::from_secs(DISPATCH_POST_TIMEOUT_SECONDS))
                .user_agent("Graphline-Dispatcher/V9")
                .build()
                .expect("FATAL: Dispatcher client initialization failed."),
        }
    }

    /**
     * Inicia el bucle perpetuo de despacho de la categoría.
     *
     * # Reliability:
     * 'MissedTickBehavior::Skip' evita acumulación de ciclos ante
     * bloqueos temporales de red o del Ledger.
     */
    pub async fn spawn_dispatch_daemon(self) {
        let category = self.category_producer.category();
        let mut dispatch_ticker = interval(Duration::from_secs(DISPATCH_TICK_SECONDS));
        dispatch_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("📮 [DISPATCHER]: Channel [{}] active.", category);

        loop {
            dispatch_ticker.tick().await;

            // 1. CENSO: sin suscriptores no hay despacho posible.
            if self
                .application_shared_state
                .subscriber_registry
                .member_count(category)
                == 0
            {
                continue;
            }

            // 2. TECHO DE CAPACIDAD DE LA CATEGORÍA.
            if self.category_producer.is_throttled().await {
                debug!("🛑 [DISPATCHER]: Channel [{}] at capacity ceiling.", category);
                continue;
            }

            // 3. SELECCIÓN Y RECLAMO.
            let Some(candidate) = self.category_producer.find_next().await else {
                continue;
            };

            // 4. ENTREGA CON CONTABILIDAD.
            if let Err(dispatch_fault) = self.deliver(candidate).await {
                error!(
                    "❌ [DISPATCH_FAULT]: Channel [{}] delivery sequence collapsed: {}",
                    category, dispatch_fault
                );
            }
        }
    }

    #[instrument(skip(self, candidate), fields(category = %candidate.category))]
    async fn deliver(&self, candidate: DispatchCandidate) -> anyhow::Result<()> {
        let category = candidate.category;

        // 1. ELECCIÓN DEL DESTINO.
        let target_subscriber_url = match &candidate.route {
            DispatchRoute::Direct(subscriber_url) => subscriber_url.clone(),
            DispatchRoute::RoundRobin => {
                let occupancy = self
                    .application_shared_state
                    .delivery_repository
                    .occupancy_by_subscriber(category)
                    .await?;

                match self
                    .application_shared_state
                    .subscriber_registry
                    .next_round_robin(category, &occupancy)
                {
                    Some(elected_member) => elected_member.url,
                    None => {
                        // Todos los miembros al tope: revertir el reclamo.
                        warn!("🛡️ [DISPATCHER]: Channel [{}] saturated. Reverting claim.", category);
                        self.revert_claim(&candidate.accountability, "all subscribers at capacity")
                            .await;
                        return Ok(());
                    }
                }
            }
        };

        // 2. CUSTODIA ANTES DEL POST (solo eventos con estado).
        if let DispatchAccountability::Statused {
            event_id, project, ..
        } = &candidate.accountability
        {
            let delivery_id = DeliveryId::generate();
            self.application_shared_state
                .delivery_repository
                .register(event_id, project.id, &delivery_id, &target_subscriber_url, category)
                .await?;
        }

        // 3. POST CON REINTENTOS DE CONECTIVIDAD ACOTADOS.
        let mut connectivity_attempts = 0u32;
        let network_response = loop {
            connectivity_attempts += 1;

            match self
                .post_envelope(&candidate, target_subscriber_url.as_str())
                .await
            {
                Ok(network_response) => break Some(network_response),
                Err(connectivity_fault) => {
                    warn!(
                        "⚠️ [DISPATCHER]: Attempt {}/{} to [{}] failed: {}",
                        connectivity_attempts,
                        MAX_DELIVERY_ATTEMPTS,
                        target_subscriber_url,
                        connectivity_fault
                    );

                    if connectivity_attempts >= MAX_DELIVERY_ATTEMPTS {
                        break None;
                    }
                    sleep(Duration::from_secs(DELIVERY_RETRY_BACKOFF_SECONDS)).await;
                }
            }
        };

        // 4. CONTABILIDAD DEL DESENLACE.
        match network_response {
            None => {
                // SUSCRIPTOR PERDIDO: baja del censo; la entrega huérfana
                // queda para el segador de zombies.
                error!(
                    "🪦 [LOST_SUBSCRIBER]: [{}] unreachable after {} attempts. Evicting.",
                    target_subscriber_url, MAX_DELIVERY_ATTEMPTS
                );
                let _ = self
                    .application_shared_state
                    .subscriber_repository
                    .delete(category, &target_subscriber_url)
                    .await;
                self.application_shared_state
                    .subscriber_registry
                    .remove(category, &target_subscriber_url);

                if let DispatchAccountability::Migration { .. } = &candidate.accountability {
                    self.record_migration_setback(
                        &candidate.accountability,
                        "subscriber unreachable",
                    )
                    .await;
                }
            }
            Some(response) => match response.status() {
                StatusCode::ACCEPTED | StatusCode::OK => {
                    self.on_accepted(&candidate.accountability).await;
                }
                StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
                    debug!(
                        "🛑 [DISPATCHER]: [{}] busy (HTTP_{}). Reverting and pausing.",
                        target_subscriber_url,
                        response.status()
                    );
                    self.clear_custody(&candidate.accountability).await;
                    self.revert_claim(&candidate.accountability, "subscriber busy").await;
                    sleep(Duration::from_secs(BUSY_SUBSCRIBER_PAUSE_SECONDS)).await;
                }
                unexpected_status => {
                    warn!(
                        "❌ [DISPATCHER]: [{}] rejected envelope with HTTP_{}. Reverting.",
                        target_subscriber_url, unexpected_status
                    );
                    self.clear_custody(&candidate.accountability).await;
                    self.revert_claim(&candidate.accountability, "unexpected response").await;
                }
            },
        }

        Ok(())
    }

    /// Forma y envía el POST multipart (parte `event` + parte `payload`).
    async fn post_envelope(
        &self,
        candidate: &DispatchCandidate,
        target_url: &str,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let event_part = multipart::Part::text(candidate.event_part.to_string())
            .mime_str("application/json")
            .expect("static mime is valid");

        let mut multipart_form = multipart::Form::new().part("event", event_part);

        if let Some(zipped_payload) = &candidate.payload {
            let payload_part = multipart::Part::bytes(zipped_payload.as_bytes().to_vec())
                .file_name("payload.gz")
                .mime_str("application/gzip")
                .expect("static mime is valid");
            multipart_form = multipart_form.part("payload", payload_part);
        }

        self.network_session_client
            .post(target_url)
            .multipart(multipart_form)
            .send()
            .await
    }

    /// Desenlace 202: la contabilidad avanza según la categoría.
    async fn on_accepted(&self, accountability: &DispatchAccountability) {
        match accountability {
            DispatchAccountability::Statused { event_id, .. } => {
                // La entrega permanece viva: el suscriptor reportará el
                // cambio de estado por el canal de retorno.
                debug!("✅ [DISPATCHER]: Event [{}] accepted by subscriber.", event_id);
            }
            DispatchAccountability::ProjectSync { project_id } => {
                if let Err(watermark_fault) = self
                    .application_shared_state
                    .sync_time_repository
                    .mark_synced(*project_id, self.category_producer.category())
                    .await
                {
                    warn!("⚠️ [DISPATCHER]: Watermark advance failed: {}", watermark_fault);
                }
            }
            DispatchAccountability::Migration { subscriber_version, .. } => {
                info!(
                    "🚀 [DISPATCHER]: Migration for version [{}] accepted.",
                    subscriber_version
                );
            }
        }
    }

    /// Purga la fila de custodia registrada antes del POST.
    async fn clear_custody(&self, accountability: &DispatchAccountability) {
        if let DispatchAccountability::Statused { event_id, project, .. } = accountability {
            let _ = self
                .application_shared_state
                .delivery_repository
                .remove(event_id, project.id)
                .await;
        }
    }

    /**
     * Revierte el reclamo devolviendo el evento a su estado predecesor.
     * Para sincronizaciones no hay nada que revertir (el watermark no
     * avanzó); para migraciones se sella un fallo recuperable.
     */
    async fn revert_claim(&self, accountability: &DispatchAccountability, reason: &str) {
        match accountability {
            DispatchAccountability::Statused {
                event_id,
                project,
                processing_status,
            } => {
                let Some(predecessor_status) = processing_status.rollback_target() else {
                    return;
                };

                let revert_outcome = self
                    .application_shared_state
                    .event_repository
                    .update_status(
                        event_id,
                        project.id,
                        &[*processing_status],
                        predecessor_status,
                        StatusMutation {
                            clear_message: true,
                            set_execution_date: Some(Utc::now()),
                            clear_delivery: true,
                            ..StatusMutation::default()
                        },
                    )
                    .await;

                match revert_outcome {
                    Ok(_) => {
                        if let Ok(project_census) = self
                            .application_shared_state
                            .event_repository
                            .project_status_census(project.id)
                            .await
                        {
                            self.application_shared_state
                                .status_gauges
                                .resync_project(&project.slug, project_census);
                        }
                    }
                    Err(revert_fault) => {
                        error!(
                            "❌ [DISPATCHER]: Revert of event [{}] failed: {}",
                            event_id, revert_fault
                        );
                    }
                }
            }
            DispatchAccountability::ProjectSync { .. } => {}
            DispatchAccountability::Migration { .. } => {
                self.record_migration_setback(accountability, reason).await;
            }
        }
    }

    async fn record_migration_setback(
        &self,
        accountability: &DispatchAccountability,
        reason: &str,
    ) {
        let DispatchAccountability::Migration {
            subscriber_url,
            subscriber_version,
        } = accountability
        else {
            return;
        };

        let setback_envelope = MigrationRequestEnvelope {
            subscriber_url: subscriber_url.clone(),
            subscriber_version: subscriber_version.clone(),
            sub_category: MigrationSubCategory::ToRecoverableFailure,
            message: Some(format!("dispatch setback: {reason}")),
        };

        if let Err(setback_fault) = self
            .application_shared_state
            .migration_repository
            .record_outcome(&setback_envelope)
            .await
        {
            error!("❌ [DISPATCHER]: Migration setback record failed: {}", setback_fault);
        }
    }
}
