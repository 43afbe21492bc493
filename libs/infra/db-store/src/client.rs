// [libs/infra/db-store/src/client.rs]
/*!
 * =================================================================
 * APARATO: LEDGER CONNECTION CLIENT (V11.2 - MEMORY ANCHORED)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DE ENLACES AL LEDGER Y BOOTSTRAP ACID
 *
 * # Mathematical Proof (In-Memory Consistency):
 * En modo RAM el cliente abre un ancla de persistencia ANTES del
 * bootstrap del esquema, garantizando que las tablas residan en un
 * segmento de memoria compartido visible entre hilos del runtime.
 * =================================================================
 */

use crate::errors::StoreError;
use crate::schema::apply_full_event_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct StoreClient {
    internal_database_driver: Arc<Database>,
    /// Mantiene la base viva en modo memoria evitando que SQLite la purgue.
    _memory_persistence_anchor: Option<Arc<Connection>>,
}

impl StoreClient {
    #[instrument(skip(database_access_token))]
    pub async fn connect(
        database_connection_url: &str,
        database_access_token: Option<String>,
    ) -> Result<Self, StoreError> {
        if database_connection_url.is_empty() {
            return Err(StoreError::ConfigurationError(
                "EVENT_LOG_DATABASE_URL undefined".into(),
            ));
        }

        info!(
            "🔌 [LEDGER]: Initiating event ledger link synchronization to [{}]",
            database_connection_url
        );

        let is_remote = database_connection_url.starts_with("libsql://")
            || database_connection_url.starts_with("https://");

        let is_memory = database_connection_url.contains(":memory:")
            || database_connection_url.contains("mode=memory");

        let database_driver = if is_remote {
            let token = database_access_token.ok_or_else(|| {
                StoreError::ConfigurationError("remote ledger access denied (token missing)".into())
            })?;
            Builder::new_remote(database_connection_url.to_string(), token)
                .build()
                .await
        } else {
            Builder::new_local(database_connection_url).build().await
        }
        .map_err(|fault| StoreError::ConnectionError(format!("DRIVER_IGNITION_FAILURE: {fault}")))?;

        let shared_driver = Arc::new(database_driver);
        let mut anchor = None;

        if is_memory {
            // El ancla se abre primero: el esquema debe cristalizar sobre ella.
            let anchor_connection = shared_driver
                .connect()
                .map_err(|fault| StoreError::ConnectionError(format!("ANCHOR_FAULT: {fault}")))?;

            apply_full_event_schema(&anchor_connection)
                .await
                .map_err(|fault| {
                    StoreError::ConnectionError(format!("SCHEMA_SYNC_FAULT: {fault}"))
                })?;

            anchor = Some(Arc::new(anchor_connection));
            info!("⚓ [LEDGER]: Memory strata solidified and anchored.");
        } else {
            let bootstrap_connection = shared_driver.connect().map_err(|fault| {
                StoreError::ConnectionError(format!("BOOTSTRAP_LINK_FAULT: {fault}"))
            })?;

            apply_full_event_schema(&bootstrap_connection)
                .await
                .map_err(|fault| {
                    StoreError::ConnectionError(format!("SCHEMA_SYNC_FAULT: {fault}"))
                })?;
        }

        Ok(Self {
            internal_database_driver: shared_driver,
            _memory_persistence_anchor: anchor,
        })
    }

    /**
     * Asigna una conexión fresca del driver. Las conexiones se adquieren
     * por operación y nunca se retienen durante un viaje HTTP.
     */
    pub fn get_connection(&self) -> Result<Connection, StoreError> {
        self.internal_database_driver.connect().map_err(|fault| {
            error!("⚠️ [POOL_FAULT]: Ledger connection allocation failed: {}", fault);
            StoreError::ConnectionError(fault.to_string())
        })
    }
}
