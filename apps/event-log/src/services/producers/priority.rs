// [apps/event-log/src/services/producers/priority.rs]
/*!
 * =================================================================
 * APARATO: PROJECT PRIORITISATION ENGINE (V8.0 - WEIGHTED ROSTER)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: PRIORIDAD PONDERADA DE PROYECTOS CANDIDATOS
 *
 * # Mathematical Proof (Starvation Freedom):
 * p = recencia * 1/(1+ocupación), con recencia de decaimiento
 * exponencial (vida media de una hora). Cada candidato se inserta en
 * el roster al menos una vez (round(p*10) con piso 1), de modo que
 * ningún proyecto con eventos elegibles queda excluido del sorteo.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use graphline_infra_db::ProjectCandidate;
use rand::Rng;

/// Multiplicador de inserciones en el roster ponderado.
const ROSTER_WEIGHT_SCALE: f64 = 10.0;

/// Vida media del componente de recencia (una hora).
const RECENCY_HALF_LIFE_SECONDS: f64 = 3_600.0;

/**
 * Prioridad p en [0, 1] de un proyecto candidato.
 * (a) recencia del evento elegible más reciente, con decaimiento
 *     exponencial, y (b) inverso de la ocupación actual.
 */
#[must_use]
pub fn project_priority(candidate: &ProjectCandidate, local_now: DateTime<Utc>) -> f64 {
    let age_seconds = (local_now - candidate.latest_eligible_date)
        .num_seconds()
        .max(0) as f64;

    let recency_component = 0.5_f64.powf(age_seconds / RECENCY_HALF_LIFE_SECONDS);
    let occupancy_component = 1.0 / (1.0 + candidate.occupancy as f64);

    (recency_component * occupancy_component).clamp(0.0, 1.0)
}

/**
 * Roster ponderado: cada candidato aparece round(p*10) veces, con piso
 * de una inserción. El sorteo uniforme sobre el roster materializa la
 * ponderación.
 */
#[must_use]
pub fn build_weighted_roster(
    candidates: &[ProjectCandidate],
    local_now: DateTime<Utc>,
) -> Vec<usize> {
    let mut weighted_roster = Vec::new();

    for (candidate_index, candidate) in candidates.iter().enumerate() {
        let priority = project_priority(candidate, local_now);
        let insertion_count = ((priority * ROSTER_WEIGHT_SCALE).round() as usize).max(1);

        for _ in 0..insertion_count {
            weighted_roster.push(candidate_index);
        }
    }

    weighted_roster
}

/// Sorteo uniforme sobre el roster; `None` con roster vacío.
#[must_use]
pub fn elect_candidate(weighted_roster: &[usize]) -> Option<usize> {
    if weighted_roster.is_empty() {
        return None;
    }

    let elected_slot = rand::thread_rng().gen_range(0..weighted_roster.len());
    Some(weighted_roster[elected_slot])
}
