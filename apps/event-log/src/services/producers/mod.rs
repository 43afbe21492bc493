// [apps/event-log/src/services/producers/mod.rs]
/*!
 * =================================================================
 * APARATO: PRODUCER FRAMEWORK ROOT (V8.0 - CATEGORY MATRIX)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: SELECCIÓN DE EVENTOS ELEGIBLES POR CATEGORÍA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FAULT SILENCE: Los productores jamás propagan fallos transitorios
 *    del Ledger al bucle de despacho; registran el rastro y ceden el
 *    turno hasta el siguiente tick.
 * 2. CLAIM-THEN-DISPATCH: Todo candidato con estado ya fue reclamado
 *    vía CAS al salir del productor; el despachador solo entrega o
 *    revierte.
 * =================================================================
 */

pub mod awaiting_generation;
pub mod clean_up;
pub mod migration_request;
pub mod priority;
pub mod project_sync;
pub mod triples_generated;

use graphline_domain_models::{
    EventCategory, EventId, EventStatus, ProjectId, ProjectReference, ServiceVersion,
    SubscriberUrl, ZippedEventPayload,
};

pub use awaiting_generation::AwaitingGenerationProducer;
pub use clean_up::CleanUpProducer;
pub use migration_request::MigrationRequestProducer;
pub use project_sync::ProjectSyncProducer;
pub use triples_generated::TriplesGeneratedProducer;

/// Destino de enrutamiento del sobre.
#[derive(Debug, Clone)]
pub enum DispatchRoute {
    /// Rotación justa entre los suscriptores bajo cupo de la categoría.
    RoundRobin,
    /// Entrega dirigida (migraciones: el ganador ya fue elegido).
    Direct(SubscriberUrl),
}

/// Contabilidad del desenlace del despacho.
#[derive(Debug, Clone)]
pub enum DispatchAccountability {
    /// Evento del log reclamado en un estado de procesamiento.
    Statused {
        event_id: EventId,
        project: ProjectReference,
        processing_status: EventStatus,
    },
    /// Sobre de sincronización a nivel de proyecto (watermark).
    ProjectSync { project_id: ProjectId },
    /// Migración despachada al ganador de la versión.
    Migration {
        subscriber_url: SubscriberUrl,
        subscriber_version: ServiceVersion,
    },
}

/// Sobre listo para despacho con su contabilidad.
#[derive(Debug)]
pub struct DispatchCandidate {
    pub category: EventCategory,
    /// Parte `event` del POST multipart.
    pub event_part: serde_json::Value,
    /// Parte `payload` opcional (bytes gzip).
    pub payload: Option<ZippedEventPayload>,
    pub route: DispatchRoute,
    pub accountability: DispatchAccountability,
}

/**
 * Matriz cerrada de productores. El despachador opera sobre esta
 * enumeración sin conocer la física interna de cada categoría.
 */
pub enum CategoryProducer {
    AwaitingGeneration(AwaitingGenerationProducer),
    TriplesGenerated(TriplesGeneratedProducer),
    ProjectSync(ProjectSyncProducer),
    CleanUp(CleanUpProducer),
    MigrationRequest(MigrationRequestProducer),
}

impl CategoryProducer {
    #[must_use]
    pub fn category(&self) -> EventCategory {
        match self {
            Self::AwaitingGeneration(_) => EventCategory::AwaitingGeneration,
            Self::TriplesGenerated(_) => EventCategory::TriplesGenerated,
            Self::ProjectSync(producer) => producer.category(),
            Self::CleanUp(_) => EventCategory::CleanUp,
            Self::MigrationRequest(_) => EventCategory::TsMigrationRequest,
        }
    }

    /// ¿La categoría superó su techo de eventos en procesamiento?
    pub async fn is_throttled(&self) -> bool {
        match self {
            Self::AwaitingGeneration(producer) => producer.is_throttled().await,
            Self::TriplesGenerated(producer) => producer.is_throttled().await,
            Self::CleanUp(producer) => producer.is_throttled().await,
            Self::ProjectSync(_) | Self::MigrationRequest(_) => false,
        }
    }

    /// Próximo sobre elegible; `None` sin trabajo o ante fallo transitorio.
    pub async fn find_next(&self) -> Option<DispatchCandidate> {
        match self {
            Self::AwaitingGeneration(producer) => producer.find_next().await,
            Self::TriplesGenerated(producer) => producer.find_next().await,
            Self::ProjectSync(producer) => producer.find_next().await,
            Self::CleanUp(producer) => producer.find_next().await,
            Self::MigrationRequest(producer) => producer.find_next().await,
        }
    }
}
