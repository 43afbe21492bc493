// [libs/domain/models-rs/src/status_change.rs]
/*!
 * =================================================================
 * APARATO: STATUS CHANGE CONTRACTS (V11.0 - EXPLICIT DELAY)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CANAL DE RETORNO SUSCRIPTOR -> EVENT LOG
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. EXPLICIT BACKOFF: El retraso de reintento de un fallo recuperable
 *    viaja en la petición (`executionDelaySeconds`); el log jamás lo
 *    infiere del texto del error.
 * 2. TAGGED DISPATCH: `subCategory` discrimina el contrato completo;
 *    un tag desconocido muere en la frontera de deserialización.
 * =================================================================
 */

use crate::envelope::ProjectReference;
use crate::identifiers::EventId;
use crate::status::EventStatus;
use serde::{Deserialize, Serialize};

/// Cambio de estado reportado por un suscriptor (o emitido por el operador).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "subCategory")]
pub enum StatusChangeRequest {
    /// Retorna un evento concreto a NEW (re-proceso dirigido).
    ToNew {
        id: EventId,
        project: ProjectReference,
    },
    /// La generación de triples terminó; el payload gzip viaja en parte aparte.
    ToTriplesGenerated {
        id: EventId,
        project: ProjectReference,
        #[serde(rename = "processingTimeMillis")]
        processing_time_millis: i64,
    },
    /// La transformación terminó y los triples residen en el store.
    ToTriplesStore {
        id: EventId,
        project: ProjectReference,
        #[serde(rename = "processingTimeMillis")]
        processing_time_millis: i64,
    },
    /// Fallo (recuperable o terminal) con retraso de reintento explícito.
    ToFailure {
        id: EventId,
        project: ProjectReference,
        #[serde(rename = "newStatus")]
        new_status: EventStatus,
        message: String,
        #[serde(rename = "executionDelaySeconds", skip_serializing_if = "Option::is_none")]
        execution_delay_seconds: Option<i64>,
    },
    /// Fallo terminal de generación instruido sin pasar por ToFailure.
    ToGenerationNonRecoverableFailure {
        id: EventId,
        project: ProjectReference,
        message: String,
    },
    /// El suscriptor cede el evento limpiamente (apagado ordenado).
    RollbackToNew {
        id: EventId,
        project: ProjectReference,
    },
    /// Cesión limpia durante la transformación.
    RollbackToTriplesGenerated {
        id: EventId,
        project: ProjectReference,
    },
    /// Marca el evento para el ciclo de borrado.
    ToAwaitingDeletion {
        id: EventId,
        project: ProjectReference,
    },
    /// Re-transforma el proyecto completo (TRIPLES_STORE -> TRIPLES_GENERATED).
    RedoProjectTransformation {
        project: ProjectReference,
    },
    /// Transición masiva post-limpieza de todos los eventos no terminales a NEW.
    ProjectEventsToNew {
        project: ProjectReference,
    },
}

impl StatusChangeRequest {
    /// Proyecto objetivo del cambio, presente en todas las variantes.
    #[must_use]
    pub fn project(&self) -> &ProjectReference {
        match self {
            Self::ToNew { project, .. }
            | Self::ToTriplesGenerated { project, .. }
            | Self::ToTriplesStore { project, .. }
            | Self::ToFailure { project, .. }
            | Self::ToGenerationNonRecoverableFailure { project, .. }
            | Self::RollbackToNew { project, .. }
            | Self::RollbackToTriplesGenerated { project, .. }
            | Self::ToAwaitingDeletion { project, .. }
            | Self::RedoProjectTransformation { project }
            | Self::ProjectEventsToNew { project } => project,
        }
    }

    /// Identificador del evento objetivo, si la variante apunta a uno.
    #[must_use]
    pub fn event_id(&self) -> Option<&EventId> {
        match self {
            Self::ToNew { id, .. }
            | Self::ToTriplesGenerated { id, .. }
            | Self::ToTriplesStore { id, .. }
            | Self::ToFailure { id, .. }
            | Self::ToGenerationNonRecoverableFailure { id, .. }
            | Self::RollbackToNew { id, .. }
            | Self::RollbackToTriplesGenerated { id, .. }
            | Self::ToAwaitingDeletion { id, .. } => Some(id),
            Self::RedoProjectTransformation { .. } | Self::ProjectEventsToNew { .. } => None,
        }
    }

    /// Valida que `ToFailure` apunte a un estado de fallo real.
    #[must_use]
    pub fn failure_target_is_legal(&self) -> bool {
        match self {
            Self::ToFailure { new_status, .. } => new_status.is_failure(),
            _ => true,
        }
    }
}
