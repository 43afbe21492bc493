// [libs/domain/models-rs/src/event.rs]
/*!
 * =================================================================
 * APARATO: EVENT AGGREGATE (V12.0 - LEDGER PARITY)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: UNIDAD SOBERANA DEL LOG DE EVENTOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. COMPOUND IDENTITY: La identidad es el par (event_id, project_id);
 *    el mismo hash de commit puede existir en proyectos distintos.
 * 2. INVARIANT GUARDS: Los invariantes de payload y mensaje se validan
 *    aquí y se re-verifican en la capa de persistencia.
 * =================================================================
 */

use crate::chronology::{BatchDate, EventDate, ExecutionDate};
use crate::identifiers::{EventId, ProjectId, ProjectSlug};
use crate::payload::ZippedEventPayload;
use crate::status::EventStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mensaje centinela sembrado por el segador de zombies antes del rollback.
pub const ZOMBIE_CHASING_SENTINEL: &str = "ZOMBIE_CHASING_EVENT";

/// Razón legible registrada junto a un estado de fallo o de rescate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventMessage(String);

impl EventMessage {
    /// Construye un mensaje no vacío; las cadenas en blanco se rechazan.
    #[must_use]
    pub fn new(raw_message: impl Into<String>) -> Option<Self> {
        let content = raw_message.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self(content))
        }
    }

    /// Centinela de rescate de zombies.
    #[must_use]
    pub fn zombie_sentinel() -> Self {
        Self(ZOMBIE_CHASING_SENTINEL.to_string())
    }

    #[must_use]
    pub fn is_zombie_sentinel(&self) -> bool {
        self.0 == ZOMBIE_CHASING_SENTINEL
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tiempo invertido en una fase completada con éxito.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingTime {
    /// Estado alcanzado al cerrar la fase.
    pub status: EventStatus,
    /// Duración física de la fase en milisegundos.
    pub duration_millis: i64,
}

/// Unidad completa del log tal como reside en el Ledger.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_id: EventId,
    pub project_id: ProjectId,
    pub project_slug: ProjectSlug,
    pub status: EventStatus,
    pub event_date: EventDate,
    pub created_date: DateTime<Utc>,
    pub execution_date: ExecutionDate,
    pub batch_date: BatchDate,
    pub message: Option<EventMessage>,
    pub payload: Option<ZippedEventPayload>,
    pub processing_times: Vec<ProcessingTime>,
}

impl Event {
    /**
     * Verifica los invariantes de retención del agregado:
     * - payload presente sii el estado lo exige,
     * - mensaje presente sii el estado es de fallo o porta el centinela.
     */
    #[must_use]
    pub fn retention_invariants_hold(&self) -> bool {
        let payload_invariant = match &self.payload {
            Some(_) => self.status.may_retain_payload(),
            None => !self.status.requires_payload(),
        };

        let message_invariant = match &self.message {
            Some(message) => self.status.is_failure() || message.is_zombie_sentinel(),
            None => true,
        };

        payload_invariant && message_invariant && self.execution_date.instant() >= self.created_date
    }
}
