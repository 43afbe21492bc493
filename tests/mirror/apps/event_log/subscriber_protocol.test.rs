// [tests/mirror/apps/event_log/subscriber_protocol.test.rs]
/**
 * =================================================================
 * APARATO: SUBSCRIBER PROTOCOL E2E TEST (V9.0 - SDK PARITY)
 * CLASIFICACIÓN: E2E INTEGRATION / SDK <-> EVENT LOG
 * RESPONSABILIDAD: CERTIFICACIÓN DEL SDK CONTRA UN LOG REAL
 *
 * # Logic:
 * Levanta el Event Log en un socket efímero y ejercita el SDK de
 * suscriptores de punta a punta: alta, renovación perpetua, reporte
 * multipart de ToTriplesGenerated y desenlace de migración.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use graphline_domain_models::{
        EventId, EventStatus, MigrationRequestEnvelope, MigrationStatus, MigrationSubCategory,
        ProjectId, ProjectReference, ProjectSlug, ServiceVersion, StatusChangeRequest,
        SubscriberDescriptor, SubscriberId, SubscriberUrl, SubscriptionPayload,
        ZippedEventPayload,
    };
    use graphline_event_log::prelude::*;
    use graphline_event_log_client::{spawn_subscription_renewal_daemon, EventLogClient};
    use graphline_infra_db::chronicle::encode_timestamp;
    use graphline_infra_db::StoreClient;
    use libsql::params;
    use std::sync::Arc;
    use std::time::Duration;

    async fn spawn_event_log(test_label: &str) -> (String, AppState) {
        let store_client = StoreClient::connect(
            &format!("file:{test_label}?mode=memory&cache=shared"),
            None,
        )
        .await
        .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.");

        let application_state = AppState::ignite(store_client)
            .await
            .expect("CRITICAL_FAULT: State ignition collapsed.");

        let router = create_sovereign_router(application_state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("CRITICAL_FAULT: Ephemeral bind failed.");
        let local_address = listener.local_addr().expect("FAULT: local_addr");

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        (format!("http://{local_address}"), application_state)
    }

    fn worker_subscription(category: &str) -> SubscriptionPayload {
        SubscriptionPayload {
            category_name: category.into(),
            subscriber: SubscriberDescriptor {
                url: SubscriberUrl("http://worker-7:9002/events".into()),
                id: SubscriberId("worker-7".into()),
                version: ServiceVersion("2.41.0".into()),
            },
            capacity: Some(2),
        }
    }

    #[tokio::test]
    async fn certify_renewal_daemon_keeps_the_census_fresh() {
        println!("\n🔍 [AUDIT]: Renewal daemon certification...");
        let (event_log_url, application_state) = spawn_event_log("sdk_renewal").await;
        let uplink = Arc::new(EventLogClient::new(event_log_url));

        let renewal_handle = spawn_subscription_renewal_daemon(
            uplink,
            worker_subscription("TRIPLES_GENERATED"),
            Duration::from_millis(10),
            Duration::from_millis(100),
        );

        // Dos ciclos de renovación deben refrescar last_seen.
        tokio::time::sleep(Duration::from_millis(150)).await;
        let first_census = application_state
            .subscriber_repository
            .list_for_category(graphline_domain_models::EventCategory::TriplesGenerated)
            .await
            .expect("FAULT: census collapsed");
        assert_eq!(first_census.len(), 1, "L3: enrollment never landed");
        let first_seen = first_census[0].last_seen;

        tokio::time::sleep(Duration::from_millis(250)).await;
        let second_census = application_state
            .subscriber_repository
            .list_for_category(graphline_domain_models::EventCategory::TriplesGenerated)
            .await
            .expect("FAULT: census collapsed");
        assert!(
            second_census[0].last_seen > first_seen,
            "L3: renewal did not refresh last_seen"
        );

        renewal_handle.abort();
        println!("   ✅ [VERDICT]: Perpetual renewal sealed.");
    }

    #[tokio::test]
    async fn certify_sdk_reports_generation_with_multipart_payload() {
        let (event_log_url, application_state) = spawn_event_log("sdk_multipart_report").await;
        let uplink = EventLogClient::new(event_log_url);

        // Siembra: evento en vuelo con custodia del worker.
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
        connection
            .execute(
                "INSERT INTO events (event_id, project_id, status, event_date, \
                 created_date, execution_date, batch_date) \
                 VALUES ('abc123', 42, 'GENERATING_TRIPLES', ?1, ?1, ?1, ?1)",
                params![stamp.clone()],
            )
            .await
            .expect("FAULT: event seed");
        connection
            .execute(
                "INSERT INTO event_deliveries (event_id, project_id, delivery_id, \
                 subscriber_url, category, registered_at) \
                 VALUES ('abc123', 42, 'd-1', 'http://worker-7:9002/events', \
                 'AWAITING_GENERATION', ?1)",
                params![stamp],
            )
            .await
            .expect("FAULT: delivery seed");

        let artifact = ZippedEventPayload::compress(br#"{"@id":"p"}"#).unwrap();
        let report = StatusChangeRequest::ToTriplesGenerated {
            id: EventId("abc123".into()),
            project: ProjectReference {
                id: ProjectId(42),
                slug: ProjectSlug("namespace/reactor".into()),
            },
            processing_time_millis: 4321,
        };

        uplink
            .post_status_change(&report, Some(&artifact))
            .await
            .expect("FAULT: SDK report rejected");

        let sealed = application_state
            .event_repository
            .find_event(&EventId("abc123".into()), ProjectId(42))
            .await
            .expect("FAULT: find collapsed")
            .expect("FAULT: event vanished");
        assert_eq!(sealed.status, EventStatus::TriplesGenerated);
        assert_eq!(sealed.payload.expect("L3: artifact not retained"), artifact);
    }

    #[tokio::test]
    async fn certify_sdk_reports_migration_outcomes() {
        let (event_log_url, application_state) = spawn_event_log("sdk_migration_report").await;
        let uplink = EventLogClient::new(event_log_url);

        // Alta vía protocolo de suscripción (crea la fila NEW).
        uplink
            .subscribe(&worker_subscription("TS_MIGRATION_REQUEST"))
            .await
            .expect("FAULT: subscription rejected");

        uplink
            .post_migration_outcome(&MigrationRequestEnvelope {
                subscriber_url: SubscriberUrl("http://worker-7:9002/events".into()),
                subscriber_version: ServiceVersion("2.41.0".into()),
                sub_category: MigrationSubCategory::ToDone,
                message: None,
            })
            .await
            .expect("FAULT: migration report rejected");

        let sealed_status = application_state
            .migration_repository
            .find_row_status(
                &SubscriberUrl("http://worker-7:9002/events".into()),
                &ServiceVersion("2.41.0".into()),
            )
            .await
            .expect("FAULT: inspection collapsed");
        assert_eq!(sealed_status, Some(MigrationStatus::Done));
    }
}
