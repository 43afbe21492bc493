// [libs/infra/db-store/src/errors.rs]
/*!
 * =================================================================
 * APARATO: LEDGER ERROR CATALOG (V11.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DEADLOCK AWARENESS: Los fallos de serialización del motor se
 *    distinguen de los fallos de consulta; los llamadores reintentan
 *    solo los primeros.
 * 2. PANOPTICON COMPLIANCE: Prefijos de estrato en cada mensaje para
 *    su clasificación cromática en el dashboard.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Error de enlace físico o de red con el cluster libSQL.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo de configuración del entorno (URL vacía o token ausente).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Fallo de serialización del motor (busy/locked); el llamador reintenta.
    #[error("[L3_DB_FAULT]: SERIALIZATION_DEADLOCK_DETECTED")]
    DeadlockDetected,

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(String),

    /// Fallo en la transformación de tipos entre SQLite y el dominio.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    /// Error al comprometer cambios en una secuencia multi-tabla.
    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE")]
    TransactionError,

    /// El evento solicitado no existe en el Ledger.
    #[error("[L3_EVENT_FAULT]: IDENTIFIER_NOT_FOUND")]
    EventNotFound,

    /// El evento no se encuentra en un estado apto para la transición.
    #[error("[L3_EVENT_FAULT]: INVALID_STATE_TRANSITION")]
    TransitionConflict,
}

impl From<libsql::Error> for StoreError {
    /**
     * Clasifica los fallos del driver: contención de cerrojo del motor
     * se reporta como deadlock reintentable; todo lo demás como fallo
     * de consulta.
     */
    fn from(driver_fault: libsql::Error) -> Self {
        let fault_text = driver_fault.to_string();
        let lowered = fault_text.to_ascii_lowercase();

        if lowered.contains("database is locked") || lowered.contains("busy") {
            Self::DeadlockDetected
        } else {
            Self::QueryError(fault_text)
        }
    }
}
