// [libs/infra/db-store/src/chronicle.rs]
/*!
 * =================================================================
 * APARATO: LEDGER TIMESTAMP CODEC (V11.0 - FIXED WIDTH)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CODIFICACIÓN CANÓNICA DE MARCAS TEMPORALES
 *
 * # Logic:
 * Todas las marcas del Ledger se registran como RFC3339 UTC con
 * precisión fija de microsegundos. El ancho fijo hace que el orden
 * lexicográfico de SQLite coincida con el orden cronológico, requisito
 * de los índices (status, execution_date) y (project_id, event_date).
 * =================================================================
 */

use crate::errors::StoreError;
use chrono::{DateTime, SecondsFormat, Utc};

/// Codifica una marca temporal al formato canónico del Ledger.
#[must_use]
pub fn encode_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/**
 * Decodifica una marca temporal registrada en el Ledger.
 *
 * # Errors:
 * - `MappingError`: Si la columna no contiene RFC3339 válido.
 */
pub fn decode_timestamp(stored_value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(stored_value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|fault| {
            StoreError::MappingError(format!("timestamp '{stored_value}' rejected: {fault}"))
        })
}
