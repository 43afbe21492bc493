// [libs/domain/models-rs/src/category.rs]
/*!
 * =================================================================
 * APARATO: EVENT CATEGORY REGISTRY (V9.0 - EVENT FABRIC)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CATÁLOGO CERRADO DE FLUJOS DE EVENTOS
 *
 * # Logic:
 * Una categoría identifica un flujo con su propio pool de suscriptores
 * y forma de sobre. Los nombres desconocidos se rechazan en la
 * frontera HTTP; el catálogo es la única autoridad de decodificación.
 * =================================================================
 */

use crate::status::EventStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flujos de eventos soportados por el backbone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    /// Eventos NEW/recuperables a la espera de generación de triples.
    AwaitingGeneration,
    /// Eventos con triples generados a la espera de transformación.
    TriplesGenerated,
    /// Sincronización de commits por proyecto.
    CommitSync,
    /// Sincronización global de commits (barrido completo).
    GlobalCommitSync,
    /// Sincronización de miembros del proyecto.
    MemberSync,
    /// Limpieza de proyectos marcados para borrado.
    CleanUp,
    /// Coordinación de migraciones del triples store.
    TsMigrationRequest,
    /// Inyección de solicitudes de sincronización desde el Webhook Gateway.
    CommitSyncRequest,
    /// Canal de retorno: cambios de estado emitidos por suscriptores.
    EventsStatusChange,
}

impl EventCategory {
    /// Nombre de cable de la categoría.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingGeneration => "AWAITING_GENERATION",
            Self::TriplesGenerated => "TRIPLES_GENERATED",
            Self::CommitSync => "COMMIT_SYNC",
            Self::GlobalCommitSync => "GLOBAL_COMMIT_SYNC",
            Self::MemberSync => "MEMBER_SYNC",
            Self::CleanUp => "CLEAN_UP",
            Self::TsMigrationRequest => "TS_MIGRATION_REQUEST",
            Self::CommitSyncRequest => "COMMIT_SYNC_REQUEST",
            Self::EventsStatusChange => "EVENTS_STATUS_CHANGE",
        }
    }

    /// Decodifica un nombre de cable; `None` para categorías desconocidas.
    #[must_use]
    pub fn from_wire(wire_name: &str) -> Option<Self> {
        match wire_name {
            "AWAITING_GENERATION" => Some(Self::AwaitingGeneration),
            "TRIPLES_GENERATED" => Some(Self::TriplesGenerated),
            "COMMIT_SYNC" => Some(Self::CommitSync),
            "GLOBAL_COMMIT_SYNC" => Some(Self::GlobalCommitSync),
            "MEMBER_SYNC" => Some(Self::MemberSync),
            "CLEAN_UP" => Some(Self::CleanUp),
            "TS_MIGRATION_REQUEST" => Some(Self::TsMigrationRequest),
            "COMMIT_SYNC_REQUEST" => Some(Self::CommitSyncRequest),
            "EVENTS_STATUS_CHANGE" => Some(Self::EventsStatusChange),
            _ => None,
        }
    }

    /// Categorías que aceptan suscripciones de workers.
    #[must_use]
    pub fn accepts_subscriptions(&self) -> bool {
        !matches!(self, Self::CommitSyncRequest | Self::EventsStatusChange)
    }

    /**
     * Estado de procesamiento que un evento adquiere al ser despachado
     * por esta categoría. Las categorías de sincronización no mutan el
     * log de eventos y devuelven `None`.
     */
    #[must_use]
    pub fn processing_status(&self) -> Option<EventStatus> {
        match self {
            Self::AwaitingGeneration => Some(EventStatus::GeneratingTriples),
            Self::TriplesGenerated => Some(EventStatus::TransformingTriples),
            Self::CleanUp => Some(EventStatus::Deleting),
            _ => None,
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}
