// [tests/mirror/apps/event_log/handlers/subscription_registry.test.rs]
/**
 * =================================================================
 * APARATO: SUBSCRIPTION REGISTRY TEST (V8.0 - ENROLLMENT EVIDENCE)
 * CLASIFICACIÓN: E2E INTEGRATION / API
 * RESPONSABILIDAD: CERTIFICACIÓN DEL PROTOCOLO DE SUSCRIPCIÓN
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use graphline_domain_models::EventCategory;
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

    fn subscription_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/subscriptions")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn certify_enrollment_and_renewal_idempotence() {
        println!("\n🔍 [AUDIT]: Subscription enrollment certification...");
        let application_state = sovereign_state("subscription_enrollment").await;
        let sovereign_router = create_sovereign_router(application_state.clone());

        let enrollment_body = json!({
            "categoryName": "AWAITING_GENERATION",
            "subscriber": {
                "url": "http://worker-7:9002/events",
                "id": "worker-7",
                "version": "2.41.0"
            },
            "capacity": 4
        });

        // Alta y renovación: mismo payload, mismo desenlace 202.
        for _ in 0..2 {
            let response = sovereign_router
                .clone()
                .oneshot(subscription_request(enrollment_body.clone()))
                .await
                .expect("CRITICAL_FAULT: Router failed to process signal.");
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }

        // Espejo RAM: un único miembro pese a la doble alta.
        assert_eq!(
            application_state
                .subscriber_registry
                .member_count(EventCategory::AwaitingGeneration),
            1
        );

        // Censo persistente sellado con su versión.
        let census = application_state
            .subscriber_repository
            .list_for_category(EventCategory::AwaitingGeneration)
            .await
            .expect("FAULT: census collapsed");
        assert_eq!(census.len(), 1);
        assert_eq!(census[0].version.as_str(), "2.41.0");
        assert_eq!(census[0].capacity, Some(4));
        assert_eq!(census[0].source_url.0, "http://worker-7:9002");

        println!("   ✅ [VERDICT]: Idempotent enrollment sealed.");
    }

    #[tokio::test]
    async fn certify_unknown_category_is_rejected() {
        let application_state = sovereign_state("subscription_unknown_category").await;
        let sovereign_router = create_sovereign_router(application_state);

        let response = sovereign_router
            .oneshot(subscription_request(json!({
                "categoryName": "TRIPLES_TELEPORT",
                "subscriber": { "url": "http://w:1/events", "id": "w", "version": "1.0.0" }
            })))
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn certify_blank_version_is_rejected() {
        let application_state = sovereign_state("subscription_blank_version").await;
        let sovereign_router = create_sovereign_router(application_state);

        let response = sovereign_router
            .oneshot(subscription_request(json!({
                "categoryName": "TRIPLES_GENERATED",
                "subscriber": { "url": "http://w:1/events", "id": "w", "version": "   " }
            })))
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn certify_migration_subscription_creates_protocol_row() {
        let application_state = sovereign_state("subscription_migration_row").await;
        let sovereign_router = create_sovereign_router(application_state.clone());

        let response = sovereign_router
            .oneshot(subscription_request(json!({
                "categoryName": "TS_MIGRATION_REQUEST",
                "subscriber": {
                    "url": "http://migrator:9002/events",
                    "id": "migrator",
                    "version": "3.0.0"
                }
            })))
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        // La fila NEW del protocolo de migración debe existir.
        let elected = application_state
            .migration_repository
            .next_migration(chrono::Utc::now())
            .await
            .expect("FAULT: selection collapsed");
        assert!(elected.is_some(), "L3: migration row not enrolled on subscription");
    }
}
