// [tests/mirror/apps/event_log/services/zombie_reaper.test.rs]
/**
 * =================================================================
 * APARATO: ZOMBIE REAPER SERVICE TEST (V9.0 - SWEEP EVIDENCE)
 * CLASIFICACIÓN: E2E INTEGRATION / DISPATCH FABRIC
 * RESPONSABILIDAD: CERTIFICACIÓN DEL BARRIDO COMPLETO DEL SEGADOR
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use graphline_domain_models::{EventId, EventStatus, ProjectId, ZOMBIE_CHASING_SENTINEL};
    use graphline_event_log::prelude::*;
    use graphline_event_log::services::ZombieReaperService;
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

    #[tokio::test]
    async fn certify_sweep_rescues_ghost_owned_transformations() {
        println!("\n🔍 [AUDIT]: Reaper sweep certification...");
        let application_state = sovereign_state("reaper_sweep").await;
        let connection = application_state
            .store_client
            .get_connection()
            .expect("FAULT: connection");

        connection
            .execute(
                "INSERT INTO projects (project_id, slug) VALUES (42, 'namespace/reactor')",
                (),
            )
            .await
            .expect("FAULT: project seed");

        let stamp = encode_timestamp(Utc::now());

        // Transformación huérfana (con payload retenido) y entrega fantasma.
        connection
            .execute(
                "INSERT INTO events (event_id, project_id, status, event_date, \
                 created_date, execution_date, batch_date, payload) \
                 VALUES ('abc123', 42, 'TRANSFORMING_TRIPLES', ?1, ?1, ?1, ?1, ?2)",
                params![stamp.clone(), b"artifact".to_vec()],
            )
            .await
            .expect("FAULT: event seed");
        connection
            .execute(
                "INSERT INTO event_deliveries (event_id, project_id, delivery_id, \
                 subscriber_url, category, registered_at) \
                 VALUES ('abc123', 42, 'd-1', 'http://ghost:9002/events', \
                 'TRIPLES_GENERATED', ?1)",
                params![stamp],
            )
            .await
            .expect("FAULT: delivery seed");

        let reaper = ZombieReaperService::new(application_state.clone());
        let rescued_count = reaper.execute_sweep().await.expect("FAULT: sweep collapsed");
        assert_eq!(rescued_count, 1, "L3: orphan transformation not rescued");

        let rescued = application_state
            .event_repository
            .find_event(&EventId("abc123".into()), ProjectId(42))
            .await
            .expect("FAULT: find collapsed")
            .expect("FAULT: event vanished");

        // Rollback al predecesor con centinela; el payload sobrevive.
        assert_eq!(rescued.status, EventStatus::TriplesGenerated);
        assert_eq!(
            rescued.message.as_ref().map(|m| m.as_str()),
            Some(ZOMBIE_CHASING_SENTINEL)
        );
        assert!(rescued.payload.is_some(), "L3: artifact lost during rescue");

        // Barrido idempotente: nada nuevo que rescatar.
        assert_eq!(reaper.execute_sweep().await.expect("FAULT: sweep collapsed"), 0);

        println!("   ✅ [VERDICT]: Sweep sealed (predecessor + sentinel + artifact).");
    }
}
