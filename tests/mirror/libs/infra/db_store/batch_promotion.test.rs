// [tests/mirror/libs/infra/db_store/batch_promotion.test.rs]
/**
 * =================================================================
 * APARATO: BATCH PROMOTION INTEGRITY TEST (V9.0 - CAUSALITY)
 * CLASIFICACIÓN: E2E INTEGRATION / LEDGER
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA PROMOCIÓN EN LOTE
 *
 * # Logic:
 * Al certificar un evento en TRIPLES_STORE, todo evento del proyecto
 * con fecha de dominio no posterior que siga en fase temprana avanza
 * en el mismo acto atómico; los estrictamente posteriores quedan
 * intactos.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use graphline_domain_models::{EventId, EventStatus, ProjectId};
    use graphline_infra_db::chronicle::encode_timestamp;
    use graphline_infra_db::{EventRepository, StatusUpdateOutcome, StoreClient};
    use libsql::params;

    const PROJECT_ID: i64 = 42;

    async fn ledger_with_batch() -> StoreClient {
        let store_client = StoreClient::connect("file:batch_promotion?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.");

        let connection = store_client.get_connection().expect("FAULT: connection");
        connection
            .execute(
                "INSERT INTO projects (project_id, slug) VALUES (?1, ?2)",
                params![PROJECT_ID, "namespace/reactor"],
            )
            .await
            .expect("FAULT: project seed");

        // e1(date=10, TRIPLES_GENERATED), e2(date=20, TRANSFORMING_TRIPLES),
        // e3(date=30, TRIPLES_GENERATED)
        let seeded_events = [
            ("e1", 10u32, "TRIPLES_GENERATED"),
            ("e2", 20, "TRANSFORMING_TRIPLES"),
            ("e3", 30, "TRIPLES_GENERATED"),
        ];

        for (event_id, day, status) in seeded_events {
            let domain_instant = Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap();
            let stamp = encode_timestamp(domain_instant);
            connection
                .execute(
                    "INSERT INTO events (event_id, project_id, status, event_date, \
                     created_date, execution_date, batch_date, payload) \
                     VALUES (?1, ?2, ?3, ?4, ?4, ?4, ?4, ?5)",
                    params![event_id, PROJECT_ID, status, stamp, b"gzip-artifact".to_vec()],
                )
                .await
                .expect("FAULT: event seed");
        }

        store_client
    }

    #[tokio::test]
    async fn certify_batch_promotion_respects_event_date_causality() {
        println!("\n🔍 [AUDIT]: Batch promotion causality certification...");
        let store_client = ledger_with_batch().await;
        let events = EventRepository::new(store_client);

        let outcome = events
            .to_triples_store(&EventId("e2".into()), ProjectId(PROJECT_ID), 9_999)
            .await
            .expect("FAULT: certification collapsed");
        assert_eq!(outcome, StatusUpdateOutcome::Updated);

        let project_events = events
            .find_project_events(ProjectId(PROJECT_ID))
            .await
            .expect("FAULT: enumeration collapsed");

        let status_of = |target: &str| {
            project_events
                .iter()
                .find(|event| event.event_id.as_str() == target)
                .map(|event| event.status)
                .expect("FAULT: event vanished")
        };

        // e1 y e2 promovidos; e3 (posterior) intacto.
        assert_eq!(status_of("e1"), EventStatus::TriplesStore, "L3: e1 not promoted");
        assert_eq!(status_of("e2"), EventStatus::TriplesStore, "L3: e2 not certified");
        assert_eq!(status_of("e3"), EventStatus::TriplesGenerated, "L3: e3 was touched");

        println!("   ✅ [VERDICT]: Promotion batch sealed with causality intact.");
    }

    #[tokio::test]
    async fn certify_certification_requires_transforming_state() {
        let store_client =
            StoreClient::connect("file:batch_promotion_guard?mode=memory&cache=shared", None)
                .await
                .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.");
        let connection = store_client.get_connection().expect("FAULT: connection");

        connection
            .execute(
                "INSERT INTO projects (project_id, slug) VALUES (?1, ?2)",
                params![7i64, "namespace/other"],
            )
            .await
            .expect("FAULT: project seed");

        let stamp = encode_timestamp(Utc::now());
        connection
            .execute(
                "INSERT INTO events (event_id, project_id, status, event_date, \
                 created_date, execution_date, batch_date) \
                 VALUES ('e-new', 7, 'NEW', ?1, ?1, ?1, ?1)",
                params![stamp],
            )
            .await
            .expect("FAULT: event seed");

        let events = EventRepository::new(store_client);
        let outcome = events
            .to_triples_store(&EventId("e-new".into()), ProjectId(7), 1)
            .await
            .expect("FAULT: certification collapsed");

        assert_eq!(outcome, StatusUpdateOutcome::Conflict, "L3: NEW event certified illegally");
    }
}
