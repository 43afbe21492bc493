// [apps/event-log/src/services/producers/migration_request.rs]
/*!
 * =================================================================
 * APARATO: TS MIGRATION PRODUCER (V8.0 - SINGLE WINNER RELAY)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: DESPACHO DIRIGIDO DE MIGRACIONES DEL STORE
 *
 * # Logic:
 * La elección del ganador ocurre en el Ledger (CAS single-winner); el
 * productor solo forma el sobre dirigido al suscriptor electo. Un
 * `None` significa: sin migración pendiente, o en manos de otro worker.
 * =================================================================
 */

use super::{DispatchAccountability, DispatchCandidate, DispatchRoute};
use crate::state::AppState;
use chrono::Utc;
use graphline_domain_models::EventCategory;
use serde_json::json;
use tracing::warn;

pub struct MigrationRequestProducer {
    application_shared_state: AppState,
}

impl MigrationRequestProducer {
    #[must_use]
    pub fn new(application_state: AppState) -> Self {
        Self {
            application_shared_state: application_state,
        }
    }

    pub async fn find_next(&self) -> Option<DispatchCandidate> {
        let elected_migration = match self
            .application_shared_state
            .migration_repository
            .next_migration(Utc::now())
            .await
        {
            Ok(elected_migration) => elected_migration?,
            Err(selection_fault) => {
                warn!("⚠️ [PRODUCER_MIGRATION]: Selection failed: {}. Yielding.", selection_fault);
                return None;
            }
        };

        let event_part = json!({
            "categoryName": EventCategory::TsMigrationRequest.as_str(),
            "subscriberUrl": elected_migration.subscriber_url.as_str(),
            "subscriberVersion": elected_migration.subscriber_version.as_str(),
        });

        Some(DispatchCandidate {
            category: EventCategory::TsMigrationRequest,
            event_part,
            payload: None,
            route: DispatchRoute::Direct(elected_migration.subscriber_url.clone()),
            accountability: DispatchAccountability::Migration {
                subscriber_url: elected_migration.subscriber_url,
                subscriber_version: elected_migration.subscriber_version,
            },
        })
    }
}
