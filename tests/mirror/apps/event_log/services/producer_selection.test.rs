// [tests/mirror/apps/event_log/services/producer_selection.test.rs]
/**
 * =================================================================
 * APARATO: PRODUCER SELECTION TEST (V9.0 - ELIGIBILITY GATES)
 * CLASIFICACIÓN: E2E INTEGRATION / DISPATCH FABRIC
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA SELECCIÓN DE CANDIDATOS
 *
 * # Logic:
 * 1. execution_date futura => el productor no ve el evento.
 * 2. Evento vencido => reclamo CAS a GENERATING_TRIPLES.
 * 3. Proyecto ocupado => cesión (invariante de exclusividad).
 * 4. Causalidad: un evento posterior ya avanzado excluye al proyecto.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use graphline_domain_models::{EventId, EventStatus, ProjectId};
    use graphline_event_log::services::producers::AwaitingGenerationProducer;
    use graphline_event_log::services::producers::{DispatchAccountability, DispatchCandidate};
    use graphline_event_log::prelude::*;
    use graphline_infra_db::chronicle::encode_timestamp;
    use graphline_infra_db::StoreClient;
    use libsql::params;

    async fn sovereign_state(test_label: &str) -> AppState {
        let store_client = StoreClient::connect(
            &format!("file:{test_label}?mode=memory&cache=shared"),
            None,
        )
        .await
        .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.");

        AppState::ignite(store_client)
            .await
            .expect("CRITICAL_FAULT: State ignition collapsed.")
    }

    async fn seed_event(
        application_state: &AppState,
        event_id: &str,
        project_id: i64,
        slug: &str,
        status: &str,
        event_date: chrono::DateTime<Utc>,
        execution_date: chrono::DateTime<Utc>,
    ) {
        let connection = application_state
            .store_client
            .get_connection()
            .expect("FAULT: connection");

        connection
            .execute(
                "INSERT OR IGNORE INTO projects (project_id, slug) VALUES (?1, ?2)",
                params![project_id, slug],
            )
            .await
            .expect("FAULT: project seed");

        let created_stamp = encode_timestamp(event_date);
        connection
            .execute(
                "INSERT INTO events (event_id, project_id, status, event_date, \
                 created_date, execution_date, batch_date) \
                 VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?4)",
                params![
                    event_id,
                    project_id,
                    status,
                    created_stamp,
                    encode_timestamp(execution_date)
                ],
            )
            .await
            .expect("FAULT: event seed");
    }

    fn statused_event_id(candidate: &DispatchCandidate) -> EventId {
        match &candidate.accountability {
            DispatchAccountability::Statused { event_id, .. } => event_id.clone(),
            other => panic!("INTEGRITY_FAULT: wrong accountability: {other:?}"),
        }
    }

    #[tokio::test]
    async fn certify_future_execution_dates_gate_selection() {
        println!("\n🔍 [AUDIT]: Eligibility horizon certification...");
        let application_state = sovereign_state("producer_future_gate").await;
        let now = Utc::now();

        seed_event(
            &application_state,
            "delayed-evt",
            42,
            "namespace/reactor",
            "NEW",
            now - Duration::minutes(10),
            now + Duration::minutes(5),
        )
        .await;

        let producer = AwaitingGenerationProducer::new(application_state.clone());

        // Antes del vencimiento: invisible.
        assert!(producer.find_next().await.is_none(), "L3: premature pickup");

        // Vencimiento simulado: adelantamos la elegibilidad en el Ledger.
        let connection = application_state
            .store_client
            .get_connection()
            .expect("FAULT: connection");
        connection
            .execute(
                "UPDATE events SET execution_date = ?1 WHERE event_id = 'delayed-evt'",
                params![encode_timestamp(now - Duration::seconds(1))],
            )
            .await
            .expect("FAULT: eligibility rewind");

        let candidate = producer.find_next().await.expect("L3: due event not selected");
        assert_eq!(statused_event_id(&candidate).as_str(), "delayed-evt");

        let claimed = application_state
            .event_repository
            .find_event(&EventId("delayed-evt".into()), ProjectId(42))
            .await
            .expect("FAULT: find collapsed")
            .expect("FAULT: event vanished");
        assert_eq!(claimed.status, EventStatus::GeneratingTriples);

        println!("   ✅ [VERDICT]: execution_date horizon honored.");
    }

    #[tokio::test]
    async fn certify_occupied_projects_yield_the_claim() {
        let application_state = sovereign_state("producer_occupancy").await;
        let now = Utc::now();

        // Un evento ya en vuelo y otro elegible del mismo proyecto.
        seed_event(
            &application_state,
            "in-flight",
            42,
            "namespace/reactor",
            "GENERATING_TRIPLES",
            now - Duration::minutes(20),
            now,
        )
        .await;
        seed_event(
            &application_state,
            "eligible",
            42,
            "namespace/reactor",
            "NEW",
            now - Duration::minutes(10),
            now - Duration::minutes(10),
        )
        .await;

        let producer = AwaitingGenerationProducer::new(application_state);

        // La guardia de no-concurrencia cede el reclamo del proyecto.
        assert!(
            producer.find_next().await.is_none(),
            "INTEGRITY_FAULT: two in-flight events for one project/category"
        );
    }

    #[tokio::test]
    async fn certify_advanced_later_events_exclude_the_project() {
        let application_state = sovereign_state("producer_causality").await;
        let now = Utc::now();

        // El evento más nuevo ya avanzó: el NEW antiguo no debe despacharse.
        seed_event(
            &application_state,
            "old-new",
            42,
            "namespace/reactor",
            "NEW",
            now - Duration::hours(2),
            now - Duration::hours(2),
        )
        .await;
        seed_event(
            &application_state,
            "newer-generated",
            42,
            "namespace/reactor",
            "TRIPLES_GENERATED",
            now - Duration::hours(1),
            now - Duration::hours(1),
        )
        .await;

        let producer = AwaitingGenerationProducer::new(application_state);

        assert!(
            producer.find_next().await.is_none(),
            "INTEGRITY_FAULT: per-project causality violated"
        );
    }

    #[tokio::test]
    async fn certify_the_newest_eligible_event_is_claimed() {
        let application_state = sovereign_state("producer_newest_first").await;
        let now = Utc::now();

        seed_event(
            &application_state,
            "older",
            42,
            "namespace/reactor",
            "NEW",
            now - Duration::hours(3),
            now - Duration::hours(3),
        )
        .await;
        seed_event(
            &application_state,
            "newest",
            42,
            "namespace/reactor",
            "GENERATION_RECOVERABLE_FAILURE",
            now - Duration::minutes(30),
            now - Duration::minutes(1),
        )
        .await;

        let producer = AwaitingGenerationProducer::new(application_state);
        let candidate = producer.find_next().await.expect("L3: no candidate selected");

        assert_eq!(statused_event_id(&candidate).as_str(), "newest");
    }
}
