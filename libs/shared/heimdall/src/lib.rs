// [libs/shared/heimdall/src/lib.rs]
/*!
 * =================================================================
 * APARATO: HEIMDALL NEURAL OBSERVER (V9.0 - EVENT FABRIC)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4/L6)
 * RESPONSABILIDAD: GESTIÓN DE TELEMETRÍA, TRAZADO Y CAPTURA DE PÁNICOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DUAL MODE: JSON plano en producción para ingesta estructurada;
 *    salida compacta y legible en desarrollo.
 * 2. PHOENIX SHIELD: Hook de pánico global con coordenadas de estrato,
 *    imprescindible en los daemons de despacho de larga vida.
 * 3. NOISE GATE: Silencia la infraestructura HTTP (hyper, tower) y el
 *    driver libSQL por defecto; el dominio habla, la tubería calla.
 * =================================================================
 */

use std::panic;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as formatting_layer, EnvFilter};

/**
 * Inicializa el sistema de trazas Heimdall con blindaje de pánicos.
 *
 * # Comportamiento:
 * - Desarrollo: logs interactivos compactos, nivel debug del dominio.
 * - Producción: tramas JSON aplanadas, nivel info del dominio.
 *
 * # Panics:
 * Si otro suscriptor global ya fue inicializado en el runtime.
 */
pub fn init_tracing(service_nominal_identifier: &str) {
    let environmental_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{service}={level},tower_http=warn,hyper=warn,reqwest=warn,libsql=error",
            service = service_nominal_identifier,
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().json().flatten_event(true))
            .init();
    }

    install_panic_shield(service_nominal_identifier);
}

/**
 * Instala el hook global de pánico (Phoenix Shield).
 *
 * Garantiza que un colapso en cualquier daemon (productores, reaper,
 * coordinador de migraciones) deje rastro estructurado antes de la
 * defunción del hilo.
 */
fn install_panic_shield(service_nominal_identifier: &str) {
    let service_id_snapshot = service_nominal_identifier.to_string();

    panic::set_hook(Box::new(move |panic_metadata| {
        let panic_location = panic_metadata
            .location()
            .map(|location| format!("{}:{}:{}", location.file(), location.line(), location.column()))
            .unwrap_or_else(|| "UNKNOWN_STRATA_COORDINATES".to_string());

        let panic_payload_message = panic_metadata
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| {
                panic_metadata
                    .payload()
                    .downcast_ref::<String>()
                    .map(String::as_str)
            })
            .unwrap_or("UNDEFINED_KERNEL_COLLAPSE_PAYLOAD");

        error!(
            target: "panic_monitor",
            service = %service_id_snapshot,
            estrato = %panic_location,
            "🔥 [CRITICAL_PANIC]: Thread terminated abruptly. Analysis: {}",
            panic_payload_message
        );
    }));
}
