// [libs/infra/db-store/src/repositories/subscriber.rs]
/*!
 * =================================================================
 * APARATO: SUBSCRIBER REPOSITORY (V10.0 - RENEWAL AWARE)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CENSO PERSISTENTE DE SUSCRIPTORES POR CATEGORÍA
 *
 * # Logic:
 * El alta es idempotente: cada renovación refresca `last_seen`. Los
 * suscriptores que dejan de renovar superado el timeout de inactividad
 * son evictados; sus entregas huérfanas pasan al dominio del segador.
 * =================================================================
 */

use crate::chronicle::{decode_timestamp, encode_timestamp};
use crate::client::StoreClient;
use crate::errors::StoreError;
use chrono::{DateTime, Utc};
use graphline_domain_models::{
    EventCategory, ServiceVersion, SourceUrl, SubscriberDescriptor, SubscriberId, SubscriberUrl,
};
use libsql::{params, Value};
use tracing::{info, instrument};

/// Fila del censo de suscriptores.
#[derive(Debug, Clone)]
pub struct SubscriberRow {
    pub category: EventCategory,
    pub url: SubscriberUrl,
    pub id: SubscriberId,
    pub version: ServiceVersion,
    pub source_url: SourceUrl,
    pub capacity: Option<i64>,
    pub last_seen: DateTime<Utc>,
}

pub struct SubscriberRepository {
    store_client: StoreClient,
}

impl SubscriberRepository {
    #[must_use]
    pub fn new(store_client: StoreClient) -> Self {
        Self { store_client }
    }

    /// Alta o renovación idempotente del suscriptor.
    #[instrument(skip(self, descriptor, source_url))]
    pub async fn upsert(
        &self,
        category: EventCategory,
        descriptor: &SubscriberDescriptor,
        source_url: &SourceUrl,
        capacity: Option<u32>,
    ) -> Result<(), StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let capacity_value: Value = capacity.map_or(Value::Null, |limit| Value::Integer(i64::from(limit)));

        ledger_connection
            .execute(
                "INSERT INTO subscribers \
                 (category, subscriber_url, subscriber_id, subscriber_version, source_url, capacity, last_seen) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
                 ON CONFLICT (category, subscriber_url) DO UPDATE SET \
                   subscriber_id = excluded.subscriber_id, \
                   subscriber_version = excluded.subscriber_version, \
                   source_url = excluded.source_url, \
                   capacity = excluded.capacity, \
                   last_seen = excluded.last_seen",
                params![
                    category.as_str(),
                    descriptor.url.as_str(),
                    descriptor.id.0.as_str(),
                    descriptor.version.as_str(),
                    source_url.0.as_str(),
                    capacity_value,
                    encode_timestamp(Utc::now())
                ],
            )
            .await?;

        Ok(())
    }

    pub async fn list_for_category(
        &self,
        category: EventCategory,
    ) -> Result<Vec<SubscriberRow>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut subscriber_rows = ledger_connection
            .query(
                "SELECT subscriber_url, subscriber_id, subscriber_version, source_url, capacity, last_seen \
                 FROM subscribers WHERE category = ?1 ORDER BY subscriber_url",
                params![category.as_str()],
            )
            .await?;

        let mut census = Vec::new();
        while let Some(subscriber_row) = subscriber_rows.next().await? {
            let last_seen_label: String = subscriber_row.get(5)?;
            census.push(SubscriberRow {
                category,
                url: SubscriberUrl(subscriber_row.get(0)?),
                id: SubscriberId(subscriber_row.get(1)?),
                version: ServiceVersion(subscriber_row.get(2)?),
                source_url: SourceUrl(subscriber_row.get(3)?),
                capacity: subscriber_row.get(4)?,
                last_seen: decode_timestamp(&last_seen_label)?,
            });
        }

        Ok(census)
    }

    /// Baja definitiva (suscriptor perdido); `false` si no existía.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        category: EventCategory,
        subscriber_url: &SubscriberUrl,
    ) -> Result<bool, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let removed_rows = ledger_connection
            .execute(
                "DELETE FROM subscribers WHERE category = ?1 AND subscriber_url = ?2",
                params![category.as_str(), subscriber_url.as_str()],
            )
            .await?;

        if removed_rows > 0 {
            info!(
                "🪦 [REGISTRY]: Subscriber [{}] evicted from category [{}].",
                subscriber_url, category
            );
        }

        Ok(removed_rows > 0)
    }

    /// Purga los suscriptores sin renovación desde el umbral dado.
    pub async fn evict_stale(
        &self,
        idle_cutoff: DateTime<Utc>,
    ) -> Result<Vec<(EventCategory, SubscriberUrl)>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        let mut stale_rows = ledger_transaction
            .query(
                "SELECT category, subscriber_url FROM subscribers WHERE last_seen < ?1",
                params![encode_timestamp(idle_cutoff)],
            )
            .await?;

        let mut evicted = Vec::new();
        while let Some(stale_row) = stale_rows.next().await? {
            let category_label: String = stale_row.get(0)?;
            let Some(category) = EventCategory::from_wire(&category_label) else {
                continue;
            };
            evicted.push((category, SubscriberUrl(stale_row.get(1)?)));
        }

        ledger_transaction
            .execute(
                "DELETE FROM subscribers WHERE last_seen < ?1",
                params![encode_timestamp(idle_cutoff)],
            )
            .await?;

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        Ok(evicted)
    }
}
