// [libs/infra/db-store/src/repositories/delivery.rs]
/*!
 * =================================================================
 * APARATO: DELIVERY REPOSITORY (V10.0 - CUSTODY TRAIL)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: RASTRO DE ENTREGAS EN VUELO
 *
 * # Logic:
 * La entrega se registra ANTES del POST al suscriptor: un colapso
 * entre selección y envío deja rastro auditable para el segador.
 * Exactamente una fila por evento en vuelo.
 * =================================================================
 */

use crate::chronicle::encode_timestamp;
use crate::client::StoreClient;
use crate::errors::StoreError;
use chrono::Utc;
use graphline_domain_models::{DeliveryId, EventCategory, EventId, ProjectId, SubscriberUrl};
use libsql::params;
use std::collections::HashMap;

pub struct DeliveryRepository {
    store_client: StoreClient,
}

impl DeliveryRepository {
    #[must_use]
    pub fn new(store_client: StoreClient) -> Self {
        Self { store_client }
    }

    /**
     * Registra la custodia de un evento por un suscriptor.
     *
     * # Errors:
     * - `TransitionConflict`: Si el evento ya tiene una entrega en vuelo.
     */
    pub async fn register(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
        delivery_id: &DeliveryId,
        subscriber_url: &SubscriberUrl,
        category: EventCategory,
    ) -> Result<(), StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let insertion_result = ledger_connection
            .execute(
                "INSERT INTO event_deliveries \
                 (event_id, project_id, delivery_id, subscriber_url, category, registered_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    event_id.as_str(),
                    project_id.value(),
                    delivery_id.0.as_str(),
                    subscriber_url.as_str(),
                    category.as_str(),
                    encode_timestamp(Utc::now())
                ],
            )
            .await;

        match insertion_result {
            Ok(_) => Ok(()),
            Err(driver_fault) => {
                let fault_text = driver_fault.to_string();
                if fault_text.contains("UNIQUE constraint failed") {
                    Err(StoreError::TransitionConflict)
                } else {
                    Err(driver_fault.into())
                }
            }
        }
    }

    /// Borra la entrega de un evento; `false` si no existía.
    pub async fn remove(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
    ) -> Result<bool, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let removed_rows = ledger_connection
            .execute(
                "DELETE FROM event_deliveries WHERE event_id = ?1 AND project_id = ?2",
                params![event_id.as_str(), project_id.value()],
            )
            .await?;

        Ok(removed_rows > 0)
    }

    pub async fn exists(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
    ) -> Result<bool, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut delivery_rows = ledger_connection
            .query(
                "SELECT 1 FROM event_deliveries WHERE event_id = ?1 AND project_id = ?2",
                params![event_id.as_str(), project_id.value()],
            )
            .await?;

        Ok(delivery_rows.next().await?.is_some())
    }

    /// ¿Posee ESTE suscriptor la custodia del evento? (guardia de C7).
    pub async fn is_held_by(
        &self,
        event_id: &EventId,
        project_id: ProjectId,
        subscriber_url: &SubscriberUrl,
    ) -> Result<bool, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut custody_rows = ledger_connection
            .query(
                "SELECT 1 FROM event_deliveries \
                 WHERE event_id = ?1 AND project_id = ?2 AND subscriber_url = ?3",
                params![event_id.as_str(), project_id.value(), subscriber_url.as_str()],
            )
            .await?;

        Ok(custody_rows.next().await?.is_some())
    }

    /// Ocupación actual por suscriptor en una categoría (fairness de despacho).
    pub async fn occupancy_by_subscriber(
        &self,
        category: EventCategory,
    ) -> Result<HashMap<SubscriberUrl, i64>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut occupancy_rows = ledger_connection
            .query(
                "SELECT subscriber_url, COUNT(*) FROM event_deliveries \
                 WHERE category = ?1 GROUP BY subscriber_url",
                params![category.as_str()],
            )
            .await?;

        let mut occupancy_map = HashMap::new();
        while let Some(occupancy_row) = occupancy_rows.next().await? {
            occupancy_map.insert(
                SubscriberUrl(occupancy_row.get(0)?),
                occupancy_row.get::<i64>(1)?,
            );
        }

        Ok(occupancy_map)
    }
}
