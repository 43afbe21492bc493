// [tests/mirror/libs/infra/db_store/event_lifecycle.test.rs]
/**
 * =================================================================
 * APARATO: EVENT LIFECYCLE INTEGRITY TEST (V9.0 - LEDGER EVIDENCE)
 * CLASIFICACIÓN: E2E INTEGRATION / LEDGER
 * RESPONSABILIDAD: CERTIFICACIÓN DEL CICLO UPSERT -> CLAIM -> TERMINAL
 *
 * # Logic:
 * Valida la física del Ledger sobre una base en RAM:
 * 1. Upsert idempotente con reinicio selectivo a NEW.
 * 2. Reclamo CAS exclusivo con guardia de no-concurrencia.
 * 3. Fallos recuperables con retraso de elegibilidad.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use graphline_domain_models::{
        EventDate, EventId, EventMessage, EventStatus, ProjectId, ProjectReference, ProjectSlug,
        ZippedEventPayload,
    };
    use graphline_infra_db::{EventRepository, StoreClient, UpsertOutcome};

    async fn ledger(test_label: &str) -> StoreClient {
        StoreClient::connect(
            &format!("file:{test_label}?mode=memory&cache=shared"),
            None,
        )
        .await
        .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.")
    }

    fn reactor_project() -> ProjectReference {
        ProjectReference {
            id: ProjectId(42),
            slug: ProjectSlug("namespace/reactor".into()),
        }
    }

    #[tokio::test]
    async fn certify_upsert_reset_and_skip_branches() {
        println!("\n🔍 [AUDIT]: Upsert branch certification...");
        let events = EventRepository::new(ledger("upsert_branches").await);
        let event_id = EventId("abc123".into());
        let project = reactor_project();
        let event_date = EventDate::clamped(Utc::now(), Utc::now());

        // 1. Ausente -> Created.
        let created = events
            .upsert_event(&event_id, &project, event_date)
            .await
            .expect("FAULT: upsert collapsed");
        assert_eq!(created, UpsertOutcome::Created);

        // 2. Presente en NEW -> Existed (reinicio).
        let rearmed = events
            .upsert_event(&event_id, &project, event_date)
            .await
            .expect("FAULT: upsert collapsed");
        assert_eq!(rearmed, UpsertOutcome::Existed);

        // 3. En procesamiento -> Skipped (intacto).
        let claimed = events
            .claim_for_generation(project.id, &project.slug, Utc::now())
            .await
            .expect("FAULT: claim collapsed")
            .expect("FAULT: eligible event not claimed");
        assert_eq!(claimed.event_id, event_id);

        let untouched = events
            .upsert_event(&event_id, &project, event_date)
            .await
            .expect("FAULT: upsert collapsed");
        assert_eq!(untouched, UpsertOutcome::Skipped);

        let hydrated = events
            .find_event(&event_id, project.id)
            .await
            .expect("FAULT: find collapsed")
            .expect("FAULT: event vanished");
        assert_eq!(hydrated.status, EventStatus::GeneratingTriples);
        println!("   ✅ [VERDICT]: Upsert branches sealed bit-perfect.");
    }

    #[tokio::test]
    async fn certify_claim_exclusivity_per_project() {
        let events = EventRepository::new(ledger("claim_exclusivity").await);
        let project = reactor_project();
        let now = Utc::now();

        for (commit, minutes_ago) in [("c-old", 30i64), ("c-new", 5)] {
            events
                .upsert_event(
                    &EventId(commit.into()),
                    &project,
                    EventDate::clamped(now - Duration::minutes(minutes_ago), now),
                )
                .await
                .expect("FAULT: upsert collapsed");
        }

        // El reclamo toma el evento elegible más reciente.
        let first_claim = events
            .claim_for_generation(project.id, &project.slug, Utc::now())
            .await
            .expect("FAULT: claim collapsed")
            .expect("FAULT: claim yielded nothing");
        assert_eq!(first_claim.event_id.as_str(), "c-new");

        // Guardia de no-concurrencia: el proyecto ya posee un evento en vuelo.
        let second_claim = events
            .claim_for_generation(project.id, &project.slug, Utc::now())
            .await
            .expect("FAULT: claim collapsed");
        assert!(second_claim.is_none(), "INTEGRITY_FAULT: double claim for one project");
    }

    #[tokio::test]
    async fn certify_recoverable_failure_delays_eligibility() {
        println!("\n🔍 [AUDIT]: Recoverable failure retry window...");
        let events = EventRepository::new(ledger("recoverable_delay").await);
        let project = reactor_project();
        let event_id = EventId("abc123".into());
        let now = Utc::now();

        events
            .upsert_event(&event_id, &project, EventDate::clamped(now, now))
            .await
            .expect("FAULT: upsert collapsed");
        events
            .claim_for_generation(project.id, &project.slug, Utc::now())
            .await
            .expect("FAULT: claim collapsed")
            .expect("FAULT: claim yielded nothing");

        // Fallo recuperable con retraso de 5 minutos.
        events
            .to_failure(
                &event_id,
                project.id,
                EventStatus::GenerationRecoverableFailure,
                EventMessage::new("net down").unwrap(),
                Some(Duration::minutes(5)),
            )
            .await
            .expect("FAULT: failure seal collapsed");

        let failed = events
            .find_event(&event_id, project.id)
            .await
            .expect("FAULT: find collapsed")
            .expect("FAULT: event vanished");
        assert_eq!(failed.status, EventStatus::GenerationRecoverableFailure);
        assert!(failed.execution_date.instant() > now + Duration::minutes(4));

        // El productor no lo ve antes del vencimiento...
        let premature = events
            .claim_for_generation(project.id, &project.slug, Utc::now())
            .await
            .expect("FAULT: claim collapsed");
        assert!(premature.is_none());

        // ...y vuelve a verlo pasado el retraso (reloj adelantado).
        let after_delay = events
            .claim_for_generation(project.id, &project.slug, Utc::now() + Duration::minutes(6))
            .await
            .expect("FAULT: claim collapsed");
        assert!(after_delay.is_some(), "INTEGRITY_FAULT: event not re-selectable after delay");
        println!("   ✅ [VERDICT]: Retry window honored.");
    }

    #[tokio::test]
    async fn certify_payload_retention_through_transformation() {
        let events = EventRepository::new(ledger("payload_retention").await);
        let project = reactor_project();
        let event_id = EventId("abc123".into());
        let now = Utc::now();

        events
            .upsert_event(&event_id, &project, EventDate::clamped(now, now))
            .await
            .expect("FAULT: upsert collapsed");
        events
            .claim_for_generation(project.id, &project.slug, Utc::now())
            .await
            .expect("FAULT: claim collapsed")
            .expect("FAULT: claim yielded nothing");

        let artifact = ZippedEventPayload::compress(br#"{"@id":"p"}"#).unwrap();
        events
            .to_triples_generated(&event_id, project.id, artifact.clone(), 1_234)
            .await
            .expect("FAULT: generation seal collapsed");

        // El reclamo de transformación transporta el payload retenido.
        let transformation_claim = events
            .claim_for_transformation(project.id, &project.slug, Utc::now())
            .await
            .expect("FAULT: claim collapsed")
            .expect("FAULT: transformation claim yielded nothing");

        assert_eq!(
            transformation_claim.payload.expect("FAULT: payload lost in ledger"),
            artifact
        );

        let hydrated = events
            .find_event(&event_id, project.id)
            .await
            .expect("FAULT: find collapsed")
            .expect("FAULT: event vanished");
        assert_eq!(hydrated.status, EventStatus::TransformingTriples);
        assert!(hydrated.retention_invariants_hold());
        assert_eq!(hydrated.processing_times.len(), 1);
    }
}
