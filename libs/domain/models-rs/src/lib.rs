// [libs/domain/models-rs/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS ROOT (V9.0 - EVENT FABRIC)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE CONTRATOS DEL BACKBONE
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE SOURCE OF TRUTH: Todos los servicios (Event Log, Webhook
 *    Gateway, Workers) consumen estos contratos; ninguna otra crate
 *    redefine estados, categorías o sobres de transporte.
 * 2. NOMINAL PURITY: Re-exportación explícita de cada entidad para
 *    erradicar rutas profundas en los estratos consumidores.
 * =================================================================
 */

pub mod category;
pub mod chronology;
pub mod envelope;
pub mod event;
pub mod identifiers;
pub mod migration;
pub mod payload;
pub mod status;
pub mod status_change;
pub mod subscription;
pub mod webhook;

pub use category::EventCategory;
pub use chronology::{BatchDate, EventDate, ExecutionDate};
pub use envelope::{EventEnvelope, ProjectReference};
pub use event::{Event, EventMessage, ProcessingTime, ZOMBIE_CHASING_SENTINEL};
pub use identifiers::{
    DeliveryId, EventId, ProjectId, ProjectSlug, ServiceVersion, SourceUrl, SubscriberId,
    SubscriberUrl,
};
pub use migration::{MigrationRequestEnvelope, MigrationStatus, MigrationSubCategory};
pub use payload::{PayloadCodecError, ZippedEventPayload};
pub use status::EventStatus;
pub use status_change::StatusChangeRequest;
pub use subscription::{SubscriberDescriptor, SubscriptionPayload};
pub use webhook::{CommitSyncRequest, PushEventPayload, PushProjectInfo};
