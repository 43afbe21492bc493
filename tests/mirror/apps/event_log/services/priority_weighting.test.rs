// [tests/mirror/apps/event_log/services/priority_weighting.test.rs]
/**
 * =================================================================
 * APARATO: PRIORITY WEIGHTING TEST (V8.0 - ROSTER FAIRNESS)
 * CLASIFICACIÓN: STATISTICAL EVIDENCE
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA PONDERACIÓN DEL SORTEO
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use graphline_domain_models::{ProjectId, ProjectSlug};
    use graphline_event_log::services::producers::priority::{
        build_weighted_roster, elect_candidate, project_priority,
    };
    use graphline_infra_db::ProjectCandidate;

    fn candidate(index: i64, age_minutes: i64, occupancy: i64) -> ProjectCandidate {
        ProjectCandidate {
            project_id: ProjectId(index),
            slug: ProjectSlug(format!("namespace/project-{index}")),
            latest_eligible_date: Utc::now() - Duration::minutes(age_minutes),
            occupancy,
        }
    }

    #[test]
    fn certify_priority_is_bounded_in_unit_interval() {
        for (age, occupancy) in [(0i64, 0i64), (1, 0), (600, 3), (60 * 24 * 365, 50)] {
            let priority = project_priority(&candidate(1, age, occupancy), Utc::now());
            assert!((0.0..=1.0).contains(&priority), "p={priority} out of [0,1]");
        }
    }

    #[test]
    fn certify_fresher_projects_dominate_the_roster() {
        let now = Utc::now();
        let roster = build_weighted_roster(
            &[candidate(0, 1, 0), candidate(1, 60 * 24, 0)],
            now,
        );

        let fresh_slots = roster.iter().filter(|index| **index == 0).count();
        let stale_slots = roster.iter().filter(|index| **index == 1).count();

        assert!(fresh_slots > stale_slots, "L2: recency not rewarded");
        assert!(stale_slots >= 1, "L2: stale project starved out of the roster");
    }

    #[test]
    fn certify_election_reaches_every_roster_member() {
        let now = Utc::now();
        let candidates = [candidate(0, 1, 0), candidate(1, 30, 1), candidate(2, 300, 2)];
        let roster = build_weighted_roster(&candidates, now);

        // Sorteo repetido: todo candidato con peso debe ser alcanzable.
        let mut elected_indices = std::collections::HashSet::new();
        for _ in 0..2_000 {
            if let Some(elected) = elect_candidate(&roster) {
                elected_indices.insert(elected);
            }
        }

        assert_eq!(
            elected_indices.len(),
            candidates.len(),
            "L2: weighted election starves roster members"
        );
    }
}
