// [tests/mirror/apps/event_log/handlers/commit_sync_ingestion.test.rs]
/**
 * =================================================================
 * APARATO: COMMIT SYNC INGESTION TEST (V8.0 - SINGLE DOOR)
 * CLASIFICACIÓN: E2E INTEGRATION / API
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA INGESTA DE COMMIT SYNC
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use graphline_event_log::prelude::*;
    use graphline_infra_db::StoreClient;
    use serde_json::json;
    use tower::ServiceExt;

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

    fn ingestion_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/events")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn enumerate_events(router: axum::Router, project_id: i64) -> Vec<serde_json::Value> {
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/events?project-id={project_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");
        assert_eq!(response.status(), StatusCode::OK);

        let body_bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("FAULT: body read collapsed");
        serde_json::from_slice(&body_bytes).expect("FAULT: enumeration decode collapsed")
    }

    #[tokio::test]
    async fn certify_commit_sync_creates_a_new_event() {
        println!("\n🔍 [AUDIT]: Commit sync ingestion certification...");
        let application_state = sovereign_state("commit_sync_created").await;
        let sovereign_router = create_sovereign_router(application_state);

        let push_instant = Utc::now();
        let ingestion_body = json!({
            "categoryName": "COMMIT_SYNC_REQUEST",
            "id": "abc",
            "project": { "id": 42, "slug": "g/p" },
            "occurredAt": push_instant.to_rfc3339()
        });

        let response = sovereign_router
            .clone()
            .oneshot(ingestion_request(ingestion_body.clone()))
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let enumeration = enumerate_events(sovereign_router.clone(), 42).await;
        assert_eq!(enumeration.len(), 1, "L3: event not materialized in the ledger");
        assert_eq!(enumeration[0]["id"], "abc");
        assert_eq!(enumeration[0]["status"], "NEW");
        assert_eq!(enumeration[0]["project"]["slug"], "g/p");

        // Re-notificación idempotente: sigue existiendo un solo evento.
        let replay = sovereign_router
            .clone()
            .oneshot(ingestion_request(ingestion_body))
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");
        assert_eq!(replay.status(), StatusCode::ACCEPTED);
        assert_eq!(enumerate_events(sovereign_router, 42).await.len(), 1);

        println!("   ✅ [VERDICT]: Commit sync ingestion sealed (NEW, idempotent).");
    }

    #[tokio::test]
    async fn certify_future_event_dates_are_clamped() {
        let application_state = sovereign_state("commit_sync_clamp").await;
        let sovereign_router = create_sovereign_router(application_state);

        let rogue_future = Utc::now() + Duration::hours(72);
        let response = sovereign_router
            .clone()
            .oneshot(ingestion_request(json!({
                "categoryName": "COMMIT_SYNC_REQUEST",
                "id": "rogue",
                "project": { "id": 7, "slug": "g/rogue" },
                "occurredAt": rogue_future.to_rfc3339()
            })))
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let enumeration = enumerate_events(sovereign_router, 7).await;
        let recorded_date: chrono::DateTime<Utc> = enumeration[0]["eventDate"]
            .as_str()
            .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .expect("FAULT: eventDate missing");

        // La pinza anti-desviación recorta a now + 24h.
        assert!(recorded_date <= Utc::now() + Duration::hours(25));
    }

    #[tokio::test]
    async fn certify_unknown_and_producer_categories_are_rejected() {
        let application_state = sovereign_state("commit_sync_rejections").await;
        let sovereign_router = create_sovereign_router(application_state);

        for bogus_category in ["TRIPLES_TELEPORT", "AWAITING_GENERATION"] {
            let response = sovereign_router
                .clone()
                .oneshot(ingestion_request(json!({
                    "categoryName": bogus_category,
                    "id": "x",
                    "project": { "id": 1, "slug": "g/x" }
                })))
                .await
                .expect("CRITICAL_FAULT: Router failed to process signal.");
            assert_eq!(
                response.status(),
                StatusCode::BAD_REQUEST,
                "L3: category [{bogus_category}] ingested illegally"
            );
        }
    }
}
