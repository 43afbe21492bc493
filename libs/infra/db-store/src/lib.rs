// [libs/infra/db-store/src/lib.rs]
/*!
 * =================================================================
 * APARATO: LEDGER PERSISTENCE ROOT (V11.0 - EVENT FABRIC)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL SUSTRATO DE PERSISTENCIA
 * =================================================================
 */

pub mod chronicle;
pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::StoreClient;
pub use errors::StoreError;
pub use repositories::delivery::DeliveryRepository;
pub use repositories::event::{
    DispatchableEvent, EventRepository, ProjectCandidate, StatusMutation, StatusUpdateOutcome,
    UpsertOutcome, ZombieEvent,
};
pub use repositories::migration::{MigrationCandidate, MigrationRepository};
pub use repositories::project::ProjectRepository;
pub use repositories::subscriber::{SubscriberRepository, SubscriberRow};
pub use repositories::sync_time::SyncTimeRepository;
