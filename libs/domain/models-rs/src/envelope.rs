// [libs/domain/models-rs/src/envelope.rs]
/*!
 * =================================================================
 * APARATO: DISPATCH ENVELOPE CONTRACTS (V10.0 - MULTIPART READY)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: SOBRE DE TRANSPORTE DESPACHADOR -> SUSCRIPTOR
 *
 * # Logic:
 * El sobre viaja como POST multipart: la parte `event` transporta el
 * JSON de este contrato y la parte opcional `payload` los bytes gzip.
 * Los campos específicos de categoría viajan aplanados en el JSON.
 * =================================================================
 */

use crate::category::EventCategory;
use crate::identifiers::{EventId, ProjectId, ProjectSlug};
use serde::{Deserialize, Serialize};

/// Referencia mínima de proyecto embebida en cada sobre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectReference {
    /// Identificador numérico del Forge.
    pub id: ProjectId,
    /// Llave de enrutamiento canónica.
    pub slug: ProjectSlug,
}

/// Parte `event` del POST multipart hacia el suscriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Categoría del flujo que origina el despacho.
    pub category_name: EventCategory,
    /// Identificador del evento; ausente en sobres de sincronización pura.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    /// Proyecto objetivo del sobre.
    pub project: ProjectReference,
    /// Campos específicos de la categoría, aplanados en el JSON.
    #[serde(flatten)]
    pub extra_fields: serde_json::Map<String, serde_json::Value>,
}

impl EventEnvelope {
    /// Sobre de evento con estado (generación, transformación, limpieza).
    #[must_use]
    pub fn statused(category: EventCategory, id: EventId, project: ProjectReference) -> Self {
        Self {
            category_name: category,
            id: Some(id),
            project,
            extra_fields: serde_json::Map::new(),
        }
    }

    /// Sobre de sincronización a nivel de proyecto (sin evento del log).
    #[must_use]
    pub fn project_sync(category: EventCategory, project: ProjectReference) -> Self {
        Self {
            category_name: category,
            id: None,
            project,
            extra_fields: serde_json::Map::new(),
        }
    }

    /// Añade un campo específico de categoría al cuerpo del sobre.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: serde_json::Value) -> Self {
        self.extra_fields.insert(key.to_string(), value);
        self
    }
}
