// [tests/mirror/apps/webhook_gateway/webhook_ingestion.test.rs]
/**
 * =================================================================
 * APARATO: WEBHOOK INGESTION TEST (V9.0 - PUSH TO LEDGER E2E)
 * CLASIFICACIÓN: E2E INTEGRATION / GATEWAY
 * RESPONSABILIDAD: CERTIFICACIÓN DEL CAMINO PUSH -> EVENT LOG
 *
 * # Logic:
 * Valida la cadena completa con un Event Log real en un socket
 * efímero: push con token válido => 202 inmediato y evento NEW en el
 * Ledger; token discordante o corrupto => 401 sin rastro.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use graphline_core_token_vault::{HookTokenClaims, HookTokenVault};
    use graphline_domain_models::{EventId, EventStatus, ProjectId};
    use graphline_webhook_gateway::prelude::*;
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;

    const HOOK_SECRET: &str = "c2VjcmV0LW1hdGVyaWFsLTIwMjY=";

    /// Levanta un Event Log real sobre un socket efímero.
    async fn spawn_event_log(
        test_label: &str,
    ) -> (String, graphline_event_log::state::AppState) {
        let store_client = graphline_infra_db::StoreClient::connect(
            &format!("file:{test_label}?mode=memory&cache=shared"),
            None,
        )
        .await
        .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.");

        let application_state = graphline_event_log::state::AppState::ignite(store_client)
            .await
            .expect("CRITICAL_FAULT: State ignition collapsed.");

        let router = graphline_event_log::routes::create_sovereign_router(application_state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("CRITICAL_FAULT: Ephemeral bind failed.");
        let local_address = listener.local_addr().expect("FAULT: local_addr");

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        (format!("http://{local_address}"), application_state)
    }

    fn sealed_token_for(project_id: i64) -> String {
        let vault = HookTokenVault::from_secret(HOOK_SECRET).expect("vault ignition");
        vault
            .seal(&HookTokenClaims {
                project_id: ProjectId(project_id),
            })
            .expect("seal collapsed")
            .as_str()
            .to_string()
    }

    fn push_request(token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhooks/events")
            .header("Content-Type", "application/json");

        if let Some(token_value) = token {
            builder = builder.header("X-Gitlab-Token", token_value);
        }

        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn certify_happy_path_push_reaches_the_ledger() {
        println!("\n🔍 [AUDIT]: Push-to-ledger happy path certification...");
        let (event_log_url, event_log_state) = spawn_event_log("webhook_happy_path").await;

        let gateway_state =
            GatewayState::ignite(HOOK_SECRET, event_log_url).expect("FAULT: gateway ignition");
        let gateway_router = create_gateway_router(gateway_state);

        let started_at = std::time::Instant::now();
        let response = gateway_router
            .oneshot(push_request(
                Some(&sealed_token_for(42)),
                json!({ "after": "abc", "project": { "id": 42, "path_with_namespace": "g/p" } }),
            ))
            .await
            .expect("CRITICAL_FAULT: Gateway failed to process signal.");

        // ACK inmediato: la respuesta no espera la persistencia.
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(started_at.elapsed() < Duration::from_millis(200), "L3: ACK was not immediate");

        // El relevo de fondo materializa el evento NEW en el Ledger.
        let mut materialized = None;
        for _ in 0..50 {
            if let Ok(Some(event)) = event_log_state
                .event_repository
                .find_event(&EventId("abc".into()), ProjectId(42))
                .await
            {
                materialized = Some(event);
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let event = materialized.expect("L3: event never reached the ledger (5s window)");
        assert_eq!(event.status, EventStatus::New);
        assert_eq!(event.project_slug.as_str(), "g/p");

        println!("   ✅ [VERDICT]: Push materialized as NEW event bit-perfect.");
    }

    #[tokio::test]
    async fn certify_project_mismatch_is_unauthorized() {
        let (event_log_url, event_log_state) = spawn_event_log("webhook_mismatch").await;
        let gateway_state =
            GatewayState::ignite(HOOK_SECRET, event_log_url).expect("FAULT: gateway ignition");
        let gateway_router = create_gateway_router(gateway_state);

        // Token sellado para el proyecto 7; cuerpo del proyecto 42.
        let response = gateway_router
            .oneshot(push_request(
                Some(&sealed_token_for(7)),
                json!({ "after": "abc", "project": { "id": 42, "path_with_namespace": "g/p" } }),
            ))
            .await
            .expect("CRITICAL_FAULT: Gateway failed to process signal.");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Sin rastro en el Ledger.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let ghost = event_log_state
            .event_repository
            .find_event(&EventId("abc".into()), ProjectId(42))
            .await
            .expect("FAULT: find collapsed");
        assert!(ghost.is_none(), "INTEGRITY_FAULT: unauthorized push created an event");
    }

    #[tokio::test]
    async fn certify_tampered_and_absent_tokens_are_unauthorized() {
        let (event_log_url, _event_log_state) = spawn_event_log("webhook_tampered").await;
        let gateway_state =
            GatewayState::ignite(HOOK_SECRET, event_log_url).expect("FAULT: gateway ignition");
        let gateway_router = create_gateway_router(gateway_state);

        let push_body =
            json!({ "after": "abc", "project": { "id": 42, "path_with_namespace": "g/p" } });

        let tampered = gateway_router
            .clone()
            .oneshot(push_request(Some("bm90LWEtcmVhbC10b2tlbg=="), push_body.clone()))
            .await
            .expect("CRITICAL_FAULT: Gateway failed to process signal.");
        assert_eq!(tampered.status(), StatusCode::UNAUTHORIZED);

        let absent = gateway_router
            .oneshot(push_request(None, push_body))
            .await
            .expect("CRITICAL_FAULT: Gateway failed to process signal.");
        assert_eq!(absent.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn certify_malformed_body_with_valid_token_is_bad_request() {
        let (event_log_url, _event_log_state) = spawn_event_log("webhook_malformed").await;
        let gateway_state =
            GatewayState::ignite(HOOK_SECRET, event_log_url).expect("FAULT: gateway ignition");
        let gateway_router = create_gateway_router(gateway_state);

        let response = gateway_router
            .oneshot(push_request(
                Some(&sealed_token_for(42)),
                json!({ "after": "abc" }),
            ))
            .await
            .expect("CRITICAL_FAULT: Gateway failed to process signal.");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
