// [apps/event-log/src/services/zombie_reaper.rs]
/*!
 * =================================================================
 * APARATO: ZOMBIE REAPER SERVICE (V9.0 - CUSTODY AUDITOR)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: RESCATE DE EVENTOS EN VUELO SIN DUEÑO
 *
 * # Logic:
 * Un evento en estado de procesamiento es zombie cuando (a) carece de
 * entrega, (b) su entrega apunta a un suscriptor desaparecido, o (c)
 * su ejecución superó el periodo de gracia. El rescate siembra el
 * centinela ZOMBIE_CHASING_EVENT y retrocede el estado al predecesor;
 * la guardia sobre el mensaje impide rescates repetidos.
 * =================================================================
 */

use crate::state::AppState;
use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// Cadencia del barrido de vigilancia.
const ZOMBIE_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Periodo de gracia de un evento en vuelo antes de declararlo estancado.
const STALE_EXECUTION_GRACE_SECONDS: i64 = 300;

/// Ancho máximo del rescate por barrido.
const MAXIMUM_RESCUE_BURST_SIZE: i64 = 50;

pub struct ZombieReaperService {
    application_shared_state: AppState,
}

impl ZombieReaperService {
    #[must_use]
    pub fn new(application_state: AppState) -> Self {
        Self {
            application_shared_state: application_state,
        }
    }

    /**
     * Inicia el bucle de vigilancia perpetua en el reactor de Tokio.
     */
    pub async fn spawn_reaper_daemon(self) {
        let mut surveillance_ticker = interval(Duration::from_secs(ZOMBIE_SWEEP_INTERVAL_SECONDS));
        surveillance_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("💀 [REAPER]: Custody audit daemon initiated.");

        loop {
            surveillance_ticker.tick().await;

            if let Err(sweep_fault) = self.execute_sweep().await {
                error!("❌ [REAPER_FAULT]: Sweep sequence collapsed: {}", sweep_fault);
            }
        }
    }

    /// Un barrido completo; expuesto para el Proving Grounds.
    pub async fn execute_sweep(&self) -> anyhow::Result<usize> {
        let local_now = Utc::now();

        let zombie_events = self
            .application_shared_state
            .event_repository
            .find_zombie_events(
                local_now,
                ChronoDuration::seconds(STALE_EXECUTION_GRACE_SECONDS),
                MAXIMUM_RESCUE_BURST_SIZE,
            )
            .await?;

        if zombie_events.is_empty() {
            return Ok(0);
        }

        warn!("💀 [REAPER]: Found {} orphan events. Initiating rescue...", zombie_events.len());

        let mut rescued_count = 0usize;
        for zombie in &zombie_events {
            match self
                .application_shared_state
                .event_repository
                .chase_zombie(zombie, local_now)
                .await
            {
                Ok(true) => {
                    rescued_count += 1;
                    self.resync_gauges_for(zombie.project_id).await;
                }
                Ok(false) => {}
                Err(rescue_fault) => {
                    warn!(
                        "⚠️ [REAPER]: Rescue of event [{}] failed: {}",
                        zombie.event_id, rescue_fault
                    );
                }
            }
        }

        info!("💀 [REAPER]: Rescue burst complete ({} events rearmed).", rescued_count);
        Ok(rescued_count)
    }

    async fn resync_gauges_for(&self, project_id: graphline_domain_models::ProjectId) {
        let Ok(Some(project)) = self
            .application_shared_state
            .project_repository
            .find_by_id(project_id)
            .await
        else {
            return;
        };

        if let Ok(project_census) = self
            .application_shared_state
            .event_repository
            .project_status_census(project_id)
            .await
        {
            self.application_shared_state
                .status_gauges
                .resync_project(&project.slug, project_census);
        }
    }
}
