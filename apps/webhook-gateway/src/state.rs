// [apps/webhook-gateway/src/state.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY STATE (V5.0 - PUSH INGRESS)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: BÓVEDA DE TOKENS Y TÚNEL AL EVENT LOG
 * =================================================================
 */

use graphline_core_token_vault::{HookTokenVault, TokenVaultError};
use graphline_event_log_client::EventLogClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct GatewayState {
    /// Motor de apertura de tokens `X-Gitlab-Token`.
    pub token_vault: Arc<HookTokenVault>,
    /// Túnel hacia el endpoint de ingesta del Event Log.
    pub event_log_client: Arc<EventLogClient>,
}

impl GatewayState {
    /**
     * Forja el estado del gateway.
     *
     * # Errors:
     * - `SecretMaterialVoid`: HOOK_TOKEN_SECRET vacío.
     */
    pub fn ignite(
        hook_token_secret: &str,
        event_log_base_url: String,
    ) -> Result<Self, TokenVaultError> {
        Ok(Self {
            token_vault: Arc::new(HookTokenVault::from_secret(hook_token_secret)?),
            event_log_client: Arc::new(EventLogClient::new(event_log_base_url)),
        })
    }
}
