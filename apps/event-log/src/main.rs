// [apps/event-log/src/main.rs]
/*!
 * =================================================================
 * APARATO: EVENT LOG MAIN ENTRY POINT (V8.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * # Mathematical Proof (Deterministic Ignition):
 * El esquema del Ledger cristaliza antes de la apertura del socket
 * TCP, previniendo estados de carrera donde un suscriptor reporte un
 * cambio de estado sobre tablas aún no solidificadas.
 * =================================================================
 */

use dotenvy::dotenv;
use graphline_event_log::prelude::*;
use graphline_shared_heimdall::init_tracing;
use tracing::{error, info};

/**
 * Punto de ignición supremo del binario del Event Log.
 */
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. INICIALIZACIÓN DE OBSERVABILIDAD NEURAL (HEIMDALL)
    init_tracing("graphline_event_log");

    // 3. RUNTIME SOBERANO
    let runtime_event_log = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime_event_log.block_on(async {
        info!("🛰️  [EVENT_LOG]: Global ignition sequence starting...");

        // 4. ADQUISICIÓN DE COORDENADAS TÁCTICAS
        let database_connection_url = match std::env::var("EVENT_LOG_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                error!("❌ [IGNITION_FAULT]: EVENT_LOG_DATABASE_URL not defined in runtime environment.");
                std::process::exit(1);
            }
        };

        let database_access_token = std::env::var("EVENT_LOG_DATABASE_AUTH_TOKEN").ok();

        let listening_network_port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        // 5. CONSTRUCCIÓN DEL KERNEL SOBERANO (ESTRATO L1-APP)
        let kernel_instance = match EventLogKernel::ignite(
            &database_connection_url,
            database_access_token,
            listening_network_port,
        )
        .await
        {
            Ok(kernel) => kernel,
            Err(ignition_fault) => {
                error!("❌ [IGNITION_FAULT]: Ledger link collapse: {}", ignition_fault);
                std::process::exit(1);
            }
        };

        // 6. IGNICIÓN DE OPERACIONES DEL FABRIC
        info!(
            "🚀 [EVENT_LOG_ONLINE]: System fully operational on port {}.",
            listening_network_port
        );
        kernel_instance.launch_sovereign_operations().await;

        Ok(())
    })
}
