// [libs/infra/db-store/src/repositories/project.rs]
/*!
 * =================================================================
 * APARATO: PROJECT REPOSITORY (V10.0 - SLUG IMMUTABLE)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE PROYECTOS DEL LEDGER
 * =================================================================
 */

use crate::client::StoreClient;
use crate::errors::StoreError;
use graphline_domain_models::{ProjectId, ProjectReference, ProjectSlug};
use libsql::params;

pub struct ProjectRepository {
    store_client: StoreClient,
}

impl ProjectRepository {
    #[must_use]
    pub fn new(store_client: StoreClient) -> Self {
        Self { store_client }
    }

    pub async fn find_by_id(
        &self,
        project_id: ProjectId,
    ) -> Result<Option<ProjectReference>, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut project_rows = ledger_connection
            .query(
                "SELECT project_id, slug FROM projects WHERE project_id = ?1",
                params![project_id.value()],
            )
            .await?;

        match project_rows.next().await? {
            None => Ok(None),
            Some(project_row) => Ok(Some(ProjectReference {
                id: ProjectId(project_row.get(0)?),
                slug: ProjectSlug(project_row.get(1)?),
            })),
        }
    }

    /// Censo total de proyectos registrados (diagnóstico del dashboard).
    pub async fn count_projects(&self) -> Result<i64, StoreError> {
        let ledger_connection = self.store_client.get_connection()?;

        let mut count_rows = ledger_connection
            .query("SELECT COUNT(*) FROM projects", ())
            .await?;

        match count_rows.next().await? {
            Some(count_row) => Ok(count_row.get(0)?),
            None => Ok(0),
        }
    }
}
