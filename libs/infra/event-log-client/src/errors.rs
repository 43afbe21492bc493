// [libs/infra/event-log-client/src/errors.rs]
/*!
 * =================================================================
 * APARATO: CLIENT ERROR CATALOG (V7.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DEL TÚNEL DE RED
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Fallo físico del túnel HTTP (DNS, TCP, TLS, timeout).
    #[error("[L3_CLIENT_NET_FAULT]: UPLINK_SEVERED -> {0}")]
    NetworkFault(#[from] reqwest::Error),

    /// El Event Log rechazó la petición con un estado inesperado.
    #[error("[L3_CLIENT_FAULT]: SERVER_REJECTION -> HTTP_{0}")]
    ServerRejection(u16),

    /// Fallo de serialización del material saliente.
    #[error("[L3_CLIENT_FAULT]: ENCODING_COLLAPSED -> {0}")]
    EncodingFault(String),
}
