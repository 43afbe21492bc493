// [libs/infra/db-store/src/repositories/sync_time.rs]
/*!
 * =================================================================
 * APARATO: SYNC TIME REPOSITORY (V10.0 - WATERMARK DRIVEN)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: WATERMARKS DE SINCRONIZACIÓN POR PROYECTO
 *
 * # Logic:
 * Las categorías de sincronización (COMMIT_SYNC, GLOBAL_COMMIT_SYNC,
 * MEMBER_SYNC) no mutan el log: eligen el proyecto con el watermark
 * más estancado y lo avanzan cuando el suscriptor acepta el sobre.
 * =================================================================
 */

use crate::chronicle::encode_timestamp;
use crate::client::StoreClient;
use crate::errors::StoreError;
use chrono::{DateTime, Utc};
use graphline_domain_models::{EventCategory, ProjectId, ProjectReference, ProjectSlug};
use libsql::params;

pub struct SyncTimeRepository {
    store_client: StoreClient,
}

impl SyncTimeRepository {
    #[must_use]
    pub fn new(store_client: StoreClient) -> Self {
        Self { store_client }
    }

    /**
     * Proyecto con el watermark más estancado para la categoría.
     * Los proyectos jamás sincronizados (watermark ausente) tienen
     * prioridad absoluta; después, el watermark más antiguo bajo el
     * umbral de frescura.
     */
    pub async fn find_stalest_project(
        &self,
        category: EventCategory,
        freshness_cutoff: DateTime<Utc>,
    ) -> Result<Option<ProjectReference>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut stale_rows = ledger_connection
            .query(
                "SELECT p.project_id, p.slug \
                 FROM projects p \
                 LEFT JOIN project_sync_times st \
                        ON st.project_id = p.project_id AND st.category = ?1 \
                 WHERE st.last_sync IS NULL OR st.last_sync <= ?2 \
                 ORDER BY st.last_sync IS NOT NULL, st.last_sync ASC \
                 LIMIT 1",
                params![category.as_str(), encode_timestamp(freshness_cutoff)],
            )
            .await?;

        match stale_rows.next().await? {
            None => Ok(None),
            Some(stale_row) => Ok(Some(ProjectReference {
                id: ProjectId(stale_row.get(0)?),
                slug: ProjectSlug(stale_row.get(1)?),
            })),
        }
    }

    /// Avanza el watermark tras la aceptación del sobre.
    pub async fn mark_synced(
        &self,
        project_id: ProjectId,
        category: EventCategory,
    ) -> Result<(), StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        ledger_connection
            .execute(
                "INSERT OR REPLACE INTO project_sync_times (project_id, category, last_sync) \
                 VALUES (?1, ?2, ?3)",
                params![
                    project_id.value(),
                    category.as_str(),
                    encode_timestamp(Utc::now())
                ],
            )
            .await?;

        Ok(())
    }
}
