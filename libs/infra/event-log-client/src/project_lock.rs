// [libs/infra/event-log-client/src/project_lock.rs]
/*!
 * =================================================================
 * APARATO: TS WRITE LOCK REGISTRY (V7.0 - SLUG KEYED)
 * CLASIFICACIÓN: CONCURRENCY GUARD (ESTRATO L3)
 * RESPONSABILIDAD: EXCLUSIVIDAD DE ESCRITURA AL TRIPLES STORE
 *
 * # Logic:
 * A lo sumo una transformación escribe al triples store por slug de
 * proyecto dentro del proceso. El cerrojo se retiene solo mientras el
 * suscriptor procesa y se libera en todo camino de salida (el guard
 * posee el mutex: drop = release, incluido pánico o cancelación).
 * =================================================================
 */

use graphline_domain_models::ProjectSlug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registro de cerrojos de escritura por slug.
#[derive(Default)]
pub struct SlugWriteLockRegistry {
    slug_locks: Mutex<HashMap<ProjectSlug, Arc<Mutex<()>>>>,
}

impl SlugWriteLockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /**
     * Adquiere el cerrojo del slug, esperando si otra transformación
     * del mismo proyecto está en curso. Slugs distintos no compiten.
     */
    pub async fn acquire(&self, project_slug: &ProjectSlug) -> OwnedMutexGuard<()> {
        let slug_lock = {
            let mut registry_guard = self.slug_locks.lock().await;

            // Purga oportunista: cerrojos sin poseedor ni esperas.
            registry_guard.retain(|_, lock| Arc::strong_count(lock) > 1);

            registry_guard
                .entry(project_slug.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        slug_lock.lock_owned().await
    }

    /// Intento no bloqueante; `None` si el slug está ocupado.
    pub async fn try_acquire(&self, project_slug: &ProjectSlug) -> Option<OwnedMutexGuard<()>> {
        let slug_lock = {
            let mut registry_guard = self.slug_locks.lock().await;
            registry_guard
                .entry(project_slug.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        slug_lock.try_lock_owned().ok()
    }
}
