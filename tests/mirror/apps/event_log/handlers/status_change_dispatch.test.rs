// [tests/mirror/apps/event_log/handlers/status_change_dispatch.test.rs]
/**
 * =================================================================
 * APARATO: STATUS CHANGE DISPATCH TEST (V9.0 - RETURN CHANNEL)
 * CLASIFICACIÓN: E2E INTEGRATION / API
 * RESPONSABILIDAD: CERTIFICACIÓN DEL CANAL DE RETORNO (C7)
 *
 * # Logic:
 * Valida la puerta única POST /events para EVENTS_STATUS_CHANGE:
 * fallos con retraso explícito, guardia de custodia, y la entrega del
 * artefacto gzip vía multipart en ToTriplesGenerated.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use graphline_domain_models::ZippedEventPayload;
    use graphline_event_log::prelude::*;
    use graphline_infra_db::chronicle::encode_timestamp;
    use graphline_infra_db::StoreClient;
    use libsql::params;
    use serde_json::json;
    use tower::ServiceExt;

    const MULTIPART_BOUNDARY: &str = "graphline-test-boundary";

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

    /// Siembra un evento en vuelo, opcionalmente con su custodia.
    async fn seed_in_flight_event(
        application_state: &AppState,
        event_id: &str,
        status: &str,
        with_custody: bool,
    ) {
        let connection = application_state
            .store_client
            .get_connection()
            .expect("FAULT: connection");

        connection
            .execute(
                "INSERT OR IGNORE INTO projects (project_id, slug) VALUES (42, 'namespace/reactor')",
                (),
            )
            .await
            .expect("FAULT: project seed");

        let stamp = encode_timestamp(Utc::now());
        connection
            .execute(
                "INSERT INTO events (event_id, project_id, status, event_date, \
                 created_date, execution_date, batch_date, payload) \
                 VALUES (?1, 42, ?2, ?3, ?3, ?3, ?3, ?4)",
                params![
                    event_id,
                    status,
                    stamp.clone(),
                    if status == "TRANSFORMING_TRIPLES" {
                        libsql::Value::Blob(b"artifact".to_vec())
                    } else {
                        libsql::Value::Null
                    }
                ],
            )
            .await
            .expect("FAULT: event seed");

        if with_custody {
            connection
                .execute(
                    "INSERT INTO event_deliveries (event_id, project_id, delivery_id, \
                     subscriber_url, category, registered_at) \
                     VALUES (?1, 42, 'd-1', 'http://worker-1:9002/events', \
                     'AWAITING_GENERATION', ?2)",
                    params![event_id, stamp],
                )
                .await
                .expect("FAULT: delivery seed");
        }
    }

    fn json_event_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/events")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn enumerate_first(router: axum::Router) -> serde_json::Value {
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/events?project-id=42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");
        let body_bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("FAULT: body read collapsed");
        let enumeration: Vec<serde_json::Value> =
            serde_json::from_slice(&body_bytes).expect("FAULT: enumeration decode");
        enumeration.into_iter().next().expect("FAULT: ledger is empty")
    }

    #[tokio::test]
    async fn certify_to_failure_applies_explicit_retry_delay() {
        println!("\n🔍 [AUDIT]: Explicit retry delay certification...");
        let application_state = sovereign_state("status_change_to_failure").await;
        seed_in_flight_event(&application_state, "abc123", "GENERATING_TRIPLES", true).await;
        let sovereign_router = create_sovereign_router(application_state);

        let response = sovereign_router
            .clone()
            .oneshot(json_event_request(json!({
                "categoryName": "EVENTS_STATUS_CHANGE",
                "subCategory": "ToFailure",
                "id": "abc123",
                "project": { "id": 42, "slug": "namespace/reactor" },
                "newStatus": "GENERATION_RECOVERABLE_FAILURE",
                "message": "net down",
                "executionDelaySeconds": 300
            })))
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let sealed_event = enumerate_first(sovereign_router).await;
        assert_eq!(sealed_event["status"], "GENERATION_RECOVERABLE_FAILURE");
        assert_eq!(sealed_event["message"], "net down");

        let execution_date: chrono::DateTime<Utc> = sealed_event["executionDate"]
            .as_str()
            .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .expect("FAULT: executionDate missing");
        assert!(execution_date > Utc::now() + Duration::minutes(4));

        println!("   ✅ [VERDICT]: execution_date = now + 5m honored.");
    }

    #[tokio::test]
    async fn certify_custody_guard_rejects_unowned_events() {
        let application_state = sovereign_state("status_change_custody").await;
        seed_in_flight_event(&application_state, "ghost-evt", "GENERATING_TRIPLES", false).await;
        let sovereign_router = create_sovereign_router(application_state);

        let response = sovereign_router
            .oneshot(json_event_request(json!({
                "categoryName": "EVENTS_STATUS_CHANGE",
                "subCategory": "ToFailure",
                "id": "ghost-evt",
                "project": { "id": 42, "slug": "namespace/reactor" },
                "newStatus": "GENERATION_RECOVERABLE_FAILURE",
                "message": "net down"
            })))
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");

        assert_eq!(
            response.status(),
            StatusCode::CONFLICT,
            "INTEGRITY_FAULT: unowned event mutated"
        );
    }

    #[tokio::test]
    async fn certify_to_triples_generated_seals_the_multipart_payload() {
        println!("\n🔍 [AUDIT]: Multipart payload sealing certification...");
        let application_state = sovereign_state("status_change_multipart").await;
        seed_in_flight_event(&application_state, "abc123", "GENERATING_TRIPLES", true).await;
        let sovereign_router = create_sovereign_router(application_state);

        let event_part = json!({
            "categoryName": "EVENTS_STATUS_CHANGE",
            "subCategory": "ToTriplesGenerated",
            "id": "abc123",
            "project": { "id": 42, "slug": "namespace/reactor" },
            "processingTimeMillis": 4321
        })
        .to_string();

        let zipped_artifact = ZippedEventPayload::compress(br#"{"@id":"p"}"#).unwrap();

        // Cuerpo multipart formado a mano (parte event + parte payload).
        let mut multipart_body: Vec<u8> = Vec::new();
        multipart_body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"event\"\r\n\
                 Content-Type: application/json\r\n\r\n{event_part}\r\n"
            )
            .as_bytes(),
        );
        multipart_body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"payload\"; filename=\"payload.gz\"\r\n\
                 Content-Type: application/gzip\r\n\r\n"
            )
            .as_bytes(),
        );
        multipart_body.extend_from_slice(zipped_artifact.as_bytes());
        multipart_body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

        let response = sovereign_router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/events")
                    .header(
                        "Content-Type",
                        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                    )
                    .body(Body::from(multipart_body))
                    .unwrap(),
            )
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let sealed_event = enumerate_first(sovereign_router).await;
        assert_eq!(sealed_event["status"], "TRIPLES_GENERATED");
        assert_eq!(sealed_event["hasPayload"], true, "L3: payload not retained");

        println!("   ✅ [VERDICT]: Artifact retained in the ledger.");
    }

    #[tokio::test]
    async fn certify_to_triples_store_completes_the_pipeline() {
        let application_state = sovereign_state("status_change_store").await;
        seed_in_flight_event(&application_state, "abc123", "TRANSFORMING_TRIPLES", true).await;
        let sovereign_router = create_sovereign_router(application_state);

        let response = sovereign_router
            .clone()
            .oneshot(json_event_request(json!({
                "categoryName": "EVENTS_STATUS_CHANGE",
                "subCategory": "ToTriplesStore",
                "id": "abc123",
                "project": { "id": 42, "slug": "namespace/reactor" },
                "processingTimeMillis": 8765
            })))
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let sealed_event = enumerate_first(sovereign_router).await;
        assert_eq!(sealed_event["status"], "TRIPLES_STORE");
    }

    #[tokio::test]
    async fn certify_unknown_sub_category_is_rejected() {
        let application_state = sovereign_state("status_change_unknown_tag").await;
        let sovereign_router = create_sovereign_router(application_state);

        let response = sovereign_router
            .oneshot(json_event_request(json!({
                "categoryName": "EVENTS_STATUS_CHANGE",
                "subCategory": "ToTeleport",
                "id": "abc123",
                "project": { "id": 42, "slug": "namespace/reactor" }
            })))
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
