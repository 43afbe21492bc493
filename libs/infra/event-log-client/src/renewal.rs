// [libs/infra/event-log-client/src/renewal.rs]
/*!
 * =================================================================
 * APARATO: SUBSCRIPTION RENEWAL DAEMON (V7.0 - PERPETUAL)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: RENOVACIÓN PERPETUA DE LA SUSCRIPCIÓN
 *
 * # Logic:
 * El registro del Event Log evicta a quien deja de renovar. El daemon
 * re-envía el payload idempotente en cada ciclo; un fallo de red no
 * interrumpe el bucle, solo deja rastro y espera el siguiente tick.
 * =================================================================
 */

use crate::client::EventLogClient;
use graphline_domain_models::SubscriptionPayload;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{info, warn};

/// Retardo inicial por defecto antes de la primera alta.
const DEFAULT_INITIAL_DELAY_SECONDS: u64 = 5;

/// Cadencia de renovación por defecto (la mitad del timeout de evicción).
const DEFAULT_RENEW_DELAY_SECONDS: u64 = 30;

/**
 * Lee los retardos de suscripción del entorno del worker:
 * `EVENT_SUBSCRIPTION_INITIAL_DELAY_SECONDS` y
 * `EVENT_SUBSCRIPTION_RENEW_DELAY_SECONDS`, con defaults sensatos.
 */
#[must_use]
pub fn renewal_delays_from_env() -> (Duration, Duration) {
    let read_seconds = |variable_name: &str, default_seconds: u64| {
        std::env::var(variable_name)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(default_seconds)
    };

    (
        Duration::from_secs(read_seconds(
            "EVENT_SUBSCRIPTION_INITIAL_DELAY_SECONDS",
            DEFAULT_INITIAL_DELAY_SECONDS,
        )),
        Duration::from_secs(read_seconds(
            "EVENT_SUBSCRIPTION_RENEW_DELAY_SECONDS",
            DEFAULT_RENEW_DELAY_SECONDS,
        )),
    )
}

/**
 * Inicia el bucle de renovación perpetua en el runtime de Tokio.
 *
 * # Reliability:
 * 'MissedTickBehavior::Skip' evita acumulación de ciclos ante bloqueos
 * temporales de red.
 */
pub fn spawn_subscription_renewal_daemon(
    uplink_client: Arc<EventLogClient>,
    subscription_payload: SubscriptionPayload,
    initial_delay: Duration,
    renew_delay: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        sleep(initial_delay).await;

        let mut renewal_ticker = interval(renew_delay);
        renewal_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "🔁 [SUBSCRIPTION]: Renewal daemon active for category [{}].",
            subscription_payload.category_name
        );

        loop {
            renewal_ticker.tick().await;

            if let Err(renewal_fault) = uplink_client.subscribe(&subscription_payload).await {
                warn!(
                    "⚠️ [SUBSCRIPTION]: Renewal failed for [{}]: {}. Retrying next cycle.",
                    subscription_payload.category_name, renewal_fault
                );
            }
        }
    })
}
