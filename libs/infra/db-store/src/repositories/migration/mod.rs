// [libs/infra/db-store/src/repositories/migration/mod.rs]
/*!
 * =================================================================
 * APARATO: TS MIGRATION REPOSITORY (V10.0 - SINGLE WINNER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: COORDINACIÓN AT-MOST-ONE DE MIGRACIONES
 *
 * # Logic:
 * La categoría de migración no fluye eventos por proyecto: elige a lo
 * sumo un worker por versión de servicio para ejecutar el cambio de
 * esquema. El algoritmo de selección:
 *   1. Lee la versión vigente V (cambio más reciente).
 *   2. DONE para V            => None (migración completa).
 *   3. SENT vigente para V    => None (otro worker la ejecuta).
 *   4. Fila elegible (NEW, fallo enfriado, SENT expirado) => CAS a SENT.
 *   5. Si tras el CAS hay más de un SENT de distintos suscriptores,
 *      rollback y None: el segundo ganador se auto-elimina.
 * =================================================================
 */

pub mod queries;

use crate::chronicle::encode_timestamp;
use crate::client::StoreClient;
use crate::errors::StoreError;
use chrono::{DateTime, Duration, Utc};
use graphline_domain_models::{
    MigrationRequestEnvelope, MigrationStatus, MigrationSubCategory, ServiceVersion, SubscriberUrl,
};
use libsql::{params, Value};
use tracing::{debug, info, instrument, warn};

use self::queries as sql_registry;

/// Ventana de vigencia de un despacho SENT antes de considerarlo perdido.
pub const SENT_STATUS_TIMEOUT_SECONDS: i64 = 60;

/// Enfriamiento de un fallo recuperable antes del reintento.
pub const RECOVERABLE_STATUS_TIMEOUT_SECONDS: i64 = 30;

/// Migración seleccionada para despacho.
#[derive(Debug, Clone)]
pub struct MigrationCandidate {
    pub subscriber_url: SubscriberUrl,
    pub subscriber_version: ServiceVersion,
}

pub struct MigrationRepository {
    store_client: StoreClient,
}

impl MigrationRepository {
    #[must_use]
    pub fn new(store_client: StoreClient) -> Self {
        Self { store_client }
    }

    /// Alta perezosa de la fila del migrador al suscribirse.
    pub async fn register_subscriber_version(
        &self,
        subscriber_url: &SubscriberUrl,
        subscriber_version: &ServiceVersion,
    ) -> Result<(), StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        ledger_connection
            .execute(
                sql_registry::REGISTER_MIGRATION_ROW,
                params![
                    subscriber_url.as_str(),
                    subscriber_version.as_str(),
                    encode_timestamp(Utc::now())
                ],
            )
            .await?;

        Ok(())
    }

    /**
     * Selección single-winner de la próxima migración a despachar.
     * Devuelve `None` cuando no hay trabajo o cuando otro worker ya
     * posee la migración de la versión vigente.
     */
    #[instrument(skip(self))]
    pub async fn next_migration(
        &self,
        local_now: DateTime<Utc>,
    ) -> Result<Option<MigrationCandidate>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;
        let ledger_transaction = ledger_connection.transaction().await?;

        // 1. VERSIÓN VIGENTE V (cambio más reciente del Ledger).
        let mut version_rows = ledger_transaction
            .query(sql_registry::FIND_LATEST_VERSION, ())
            .await?;

        let Some(version_row) = version_rows.next().await? else {
            return Ok(None);
        };
        let current_version: String = version_row.get(0)?;

        // 2. MIGRACIÓN YA COMPLETA.
        let done_count: i64 = Self::scalar(
            &ledger_transaction,
            sql_registry::COUNT_DONE_FOR_VERSION,
            params![current_version.clone()],
        )
        .await?;
        if done_count > 0 {
            return Ok(None);
        }

        // 3. OTRO WORKER LA EJECUTA (SENT dentro de la ventana de vigencia).
        let sent_freshness_floor =
            encode_timestamp(local_now - Duration::seconds(SENT_STATUS_TIMEOUT_SECONDS));
        let fresh_sent_count: i64 = Self::scalar(
            &ledger_transaction,
            sql_registry::COUNT_FRESH_SENT_FOR_VERSION,
            params![current_version.clone(), sent_freshness_floor.clone()],
        )
        .await?;
        if fresh_sent_count > 0 {
            debug!("💤 [MIGRATION]: Version [{}] already in flight. Standby.", current_version);
            return Ok(None);
        }

        // 4. FILA ELEGIBLE MÁS RECIENTE.
        let recoverable_cooling_floor =
            encode_timestamp(local_now - Duration::seconds(RECOVERABLE_STATUS_TIMEOUT_SECONDS));

        let mut eligible_rows = ledger_transaction
            .query(
                sql_registry::FIND_ELIGIBLE_ROW,
                params![
                    current_version.clone(),
                    recoverable_cooling_floor,
                    sent_freshness_floor.clone()
                ],
            )
            .await?;

        let Some(eligible_row) = eligible_rows.next().await? else {
            return Ok(None);
        };
        let elected_subscriber_url: String = eligible_row.get(0)?;

        // 5. CAS HACIA SENT.
        let claimed_rows = ledger_transaction
            .execute(
                sql_registry::CLAIM_MIGRATION,
                params![
                    elected_subscriber_url.clone(),
                    current_version.clone(),
                    encode_timestamp(local_now),
                    sent_freshness_floor.clone()
                ],
            )
            .await?;

        if claimed_rows == 0 {
            return Ok(None);
        }

        // 6. DETECCIÓN DE DOBLE GANADOR: rollback del segundo.
        let concurrent_sent_subscribers: i64 = Self::scalar(
            &ledger_transaction,
            sql_registry::COUNT_SENT_SUBSCRIBERS_FOR_VERSION,
            params![current_version.clone(), sent_freshness_floor],
        )
        .await?;

        if concurrent_sent_subscribers > 1 {
            warn!(
                "🛡️ [MIGRATION]: Duplicate winner detected for version [{}]. Yielding.",
                current_version
            );
            ledger_transaction
                .rollback()
                .await
                .map_err(|_| StoreError::TransactionError)?;
            return Ok(None);
        }

        ledger_transaction
            .commit()
            .await
            .map_err(|_| StoreError::TransactionError)?;

        info!(
            "🚀 [MIGRATION]: Version [{}] assigned to [{}].",
            current_version, elected_subscriber_url
        );

        Ok(Some(MigrationCandidate {
            subscriber_url: SubscriberUrl(elected_subscriber_url),
            subscriber_version: ServiceVersion(current_version),
        }))
    }

    /// Sella el desenlace reportado por el worker migrador.
    #[instrument(skip(self, envelope))]
    pub async fn record_outcome(
        &self,
        envelope: &MigrationRequestEnvelope,
    ) -> Result<bool, StoreError> {
        let outcome_status = match envelope.sub_category {
            MigrationSubCategory::ToSent => MigrationStatus::Sent,
            MigrationSubCategory::ToDone => MigrationStatus::Done,
            MigrationSubCategory::ToRecoverableFailure => MigrationStatus::RecoverableFailure,
            MigrationSubCategory::ToNonRecoverableFailure => MigrationStatus::NonRecoverableFailure,
        };

        let message_value: Value = envelope
            .message
            .clone()
            .map_or(Value::Null, Value::Text);

        let ledger_connection = self.store_client.get_connection()?;
        let sealed_rows = ledger_connection
            .execute(
                sql_registry::RECORD_OUTCOME,
                params![
                    envelope.subscriber_url.as_str(),
                    envelope.subscriber_version.as_str(),
                    outcome_status.as_str(),
                    encode_timestamp(Utc::now()),
                    message_value
                ],
            )
            .await?;

        Ok(sealed_rows == 1)
    }

    /// Inspección del estado de una fila (diagnóstico y tests).
    pub async fn find_row_status(
        &self,
        subscriber_url: &SubscriberUrl,
        subscriber_version: &ServiceVersion,
    ) -> Result<Option<MigrationStatus>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut inspection_rows = ledger_connection
            .query(
                sql_registry::FIND_ROW,
                params![subscriber_url.as_str(), subscriber_version.as_str()],
            )
            .await?;

        match inspection_rows.next().await? {
            None => Ok(None),
            Some(inspection_row) => {
                let status_label: String = inspection_row.get(0)?;
                MigrationStatus::from_wire(&status_label)
                    .map(Some)
                    .ok_or_else(|| {
                        StoreError::MappingError(format!(
                            "unknown migration status '{status_label}' in ledger"
                        ))
                    })
            }
        }
    }

    async fn scalar(
        ledger_transaction: &libsql::Transaction,
        scalar_statement: &str,
        scalar_params: impl libsql::params::IntoParams,
    ) -> Result<i64, StoreError> {
        let mut scalar_rows = ledger_transaction
            .query(scalar_statement, scalar_params)
            .await?;

        match scalar_rows.next().await? {
            Some(scalar_row) => Ok(scalar_row.get(0)?),
            None => Ok(0),
        }
    }
}
