// [libs/domain/models-rs/src/migration.rs]
/*!
 * =================================================================
 * APARATO: TS MIGRATION CONTRACTS (V10.0 - SINGLE WINNER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: PROTOCOLO DE COORDINACIÓN DE MIGRACIONES
 *
 * # Logic:
 * La categoría de migración no transporta eventos por proyecto:
 * coordina cambios de esquema entre workers. El contrato de retorno
 * (`subCategory`) sella el desenlace por (subscriberUrl, version).
 * =================================================================
 */

use crate::identifiers::{ServiceVersion, SubscriberUrl};
use serde::{Deserialize, Serialize};

/// Estado de una fila de migración en el Ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationStatus {
    New,
    Sent,
    Done,
    RecoverableFailure,
    NonRecoverableFailure,
}

impl MigrationStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Sent => "SENT",
            Self::Done => "DONE",
            Self::RecoverableFailure => "RECOVERABLE_FAILURE",
            Self::NonRecoverableFailure => "NON_RECOVERABLE_FAILURE",
        }
    }

    #[must_use]
    pub fn from_wire(wire_name: &str) -> Option<Self> {
        match wire_name {
            "NEW" => Some(Self::New),
            "SENT" => Some(Self::Sent),
            "DONE" => Some(Self::Done),
            "RECOVERABLE_FAILURE" => Some(Self::RecoverableFailure),
            "NON_RECOVERABLE_FAILURE" => Some(Self::NonRecoverableFailure),
            _ => None,
        }
    }
}

/// Desenlace reportado por el worker migrador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationSubCategory {
    /// Marca administrativa: la migración fue despachada.
    ToSent,
    /// La migración terminó con éxito para la versión.
    ToDone,
    /// Fallo transitorio; reintentable tras el timeout de gracia.
    ToRecoverableFailure,
    /// Fallo terminal; requiere intervención humana.
    ToNonRecoverableFailure,
}

/// Sobre de reporte de migración (worker -> event log).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRequestEnvelope {
    /// Endpoint del worker que reporta.
    pub subscriber_url: SubscriberUrl,
    /// Versión de servicio cuya migración se reporta.
    pub subscriber_version: ServiceVersion,
    /// Desenlace de la migración.
    pub sub_category: MigrationSubCategory,
    /// Razón del fallo cuando aplica.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
