// [apps/event-log/src/state/status_gauges.rs]
/*!
 * =================================================================
 * APARATO: STATUS GAUGE MANAGER (V8.0 - LEDGER MIRROR)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: CONTADORES DE ESTADO POR PROYECTO EN RAM
 *
 * # Logic:
 * Los gauges son un espejo en RAM del censo del Ledger: se
 * reconstruyen al arrancar, se ajustan en cada transición sellada y
 * se re-sincronizan por proyecto tras operaciones en lote. Nunca son
 * fuente de verdad, solo instrumento del dashboard.
 * =================================================================
 */

use graphline_domain_models::{EventStatus, ProjectSlug};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::error;

#[derive(Default)]
pub struct StatusGaugeManager {
    project_gauges: RwLock<HashMap<ProjectSlug, HashMap<EventStatus, i64>>>,
}

impl StatusGaugeManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstrucción total desde el censo del Ledger.
    pub fn rebuild(&self, ledger_census: Vec<(ProjectSlug, EventStatus, i64)>) {
        match self.project_gauges.write() {
            Ok(mut gauges_guard) => {
                gauges_guard.clear();
                for (slug, status, count) in ledger_census {
                    gauges_guard.entry(slug).or_default().insert(status, count);
                }
            }
            Err(lock_poison_fault) => {
                error!("💀 [GAUGES_FATAL]: Gauge lock poisoned: {}", lock_poison_fault);
            }
        }
    }

    /// Re-sincroniza un solo proyecto tras una operación en lote.
    pub fn resync_project(
        &self,
        slug: &ProjectSlug,
        project_census: Vec<(ProjectSlug, EventStatus, i64)>,
    ) {
        if let Ok(mut gauges_guard) = self.project_gauges.write() {
            gauges_guard.remove(slug);
            for (census_slug, status, count) in project_census {
                gauges_guard
                    .entry(census_slug)
                    .or_default()
                    .insert(status, count);
            }
        }
    }

    pub fn increment(&self, slug: &ProjectSlug, status: EventStatus) {
        if let Ok(mut gauges_guard) = self.project_gauges.write() {
            *gauges_guard
                .entry(slug.clone())
                .or_default()
                .entry(status)
                .or_insert(0) += 1;
        }
    }

    pub fn decrement(&self, slug: &ProjectSlug, status: EventStatus) {
        if let Ok(mut gauges_guard) = self.project_gauges.write() {
            if let Some(project_counters) = gauges_guard.get_mut(slug) {
                let counter = project_counters.entry(status).or_insert(0);
                *counter = (*counter - 1).max(0);
            }
        }
    }

    /// Transición sellada: decrementa el origen e incrementa el destino.
    pub fn move_gauge(&self, slug: &ProjectSlug, from_status: EventStatus, to_status: EventStatus) {
        self.decrement(slug, from_status);
        self.increment(slug, to_status);
    }

    /// Retira un proyecto purgado del instrumento.
    pub fn remove_project(&self, slug: &ProjectSlug) {
        if let Ok(mut gauges_guard) = self.project_gauges.write() {
            gauges_guard.remove(slug);
        }
    }

    #[must_use]
    pub fn count(&self, slug: &ProjectSlug, status: EventStatus) -> i64 {
        self.project_gauges
            .read()
            .ok()
            .and_then(|gauges_guard| {
                gauges_guard
                    .get(slug)
                    .and_then(|project_counters| project_counters.get(&status).copied())
            })
            .unwrap_or(0)
    }

    /// Instantánea JSON-ready para el endpoint de diagnóstico.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, HashMap<String, i64>> {
        let mut gauges_snapshot = HashMap::new();

        if let Ok(gauges_guard) = self.project_gauges.read() {
            for (slug, project_counters) in gauges_guard.iter() {
                let counters_snapshot: HashMap<String, i64> = project_counters
                    .iter()
                    .filter(|(_, count)| **count > 0)
                    .map(|(status, count)| (status.as_str().to_string(), *count))
                    .collect();

                if !counters_snapshot.is_empty() {
                    gauges_snapshot.insert(slug.as_str().to_string(), counters_snapshot);
                }
            }
        }

        gauges_snapshot
    }
}
