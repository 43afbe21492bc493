// [apps/webhook-gateway/src/main.rs]
/*!
 * =================================================================
 * APARATO: WEBHOOK GATEWAY MAIN ENTRY POINT (V5.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP E IGNICIÓN SEGURA DEL GATEWAY
 * =================================================================
 */

use dotenvy::dotenv;
use graphline_shared_heimdall::init_tracing;
use graphline_webhook_gateway::prelude::*;
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. OBSERVABILIDAD NEURAL (HEIMDALL)
    init_tracing("graphline_webhook_gateway");

    let runtime_gateway = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime_gateway.block_on(async {
        info!("🛰️  [WEBHOOK_GATEWAY]: Ignition sequence starting...");

        // 3. COORDENADAS TÁCTICAS
        let hook_token_secret = match std::env::var("HOOK_TOKEN_SECRET") {
            Ok(secret_material) => secret_material,
            Err(_) => {
                error!("❌ [IGNITION_FAULT]: HOOK_TOKEN_SECRET not defined in runtime environment.");
                std::process::exit(1);
            }
        };

        let event_log_base_url = std::env::var("EVENT_LOG_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let listening_network_port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .unwrap_or(3001);

        // 4. ESTADO DEL GATEWAY (BÓVEDA + TÚNEL)
        let gateway_state = match GatewayState::ignite(&hook_token_secret, event_log_base_url) {
            Ok(gateway_state) => gateway_state,
            Err(vault_fault) => {
                error!("❌ [IGNITION_FAULT]: Token vault collapse: {}", vault_fault);
                std::process::exit(1);
            }
        };

        // 5. TRANSPORTE HTTP
        let gateway_router = create_gateway_router(gateway_state);
        let bind_address = SocketAddr::new(
            "0.0.0.0".parse::<IpAddr>().expect("static address is valid"),
            listening_network_port,
        );

        let tcp_listener = match tokio::net::TcpListener::bind(bind_address).await {
            Ok(tcp_listener) => tcp_listener,
            Err(bind_fault) => {
                error!("💀 [IGNITION_FAULT]: Failed to bind network port: {}", bind_fault);
                std::process::exit(1);
            }
        };

        info!(
            "🚀 [GATEWAY_ONLINE]: Push ingress listening on port {}.",
            listening_network_port
        );

        if let Err(server_error) = axum::serve(tcp_listener, gateway_router).await {
            error!("💀 [GATEWAY_COLLAPSE]: Runtime failure: {}", server_error);
            std::process::exit(1);
        }

        Ok(())
    })
}
