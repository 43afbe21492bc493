// [libs/domain/models-rs/src/identifiers.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN IDENTIFIER NEWTYPES (V9.0 - EVENT FABRIC)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: TIPOS DIMINUTOS CON ETIQUETA DE TIPO (TINY TYPES)
 *
 * # Logic:
 * Cada identificador viaja envuelto en un newtype transparente. El
 * compilador rechaza mezclar un EventId con un DeliveryId aunque ambos
 * sean Strings en el cable. Serde los serializa como el escalar puro.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identificador único del evento dentro de un proyecto (hash de commit del Forge).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

/// Identificador numérico del proyecto asignado por el Forge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

/// Ruta canónica legible del proyecto (`namespace/name`). Llave de enrutamiento.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectSlug(pub String);

/// Identificador lógico del suscriptor (estable entre reinicios del worker).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(pub String);

/// Endpoint HTTP donde el suscriptor recibe sobres de eventos.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberUrl(pub String);

/// Host físico que aloja al worker; permite reasignar entregas al desaparecer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceUrl(pub String);

/// Identificador de una entrega en vuelo registrada antes del POST.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(pub String);

/// Versión semántica del servicio suscriptor; llave del protocolo de migración.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceVersion(pub String);

impl DeliveryId {
    /// Forja un identificador de entrega fresco (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl EventId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ProjectId {
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl ProjectSlug {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SubscriberUrl {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ServiceVersion {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for ProjectSlug {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for SubscriberUrl {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for ServiceVersion {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
