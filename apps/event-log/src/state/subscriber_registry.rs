// [apps/event-log/src/state/subscriber_registry.rs]
/*!
 * =================================================================
 * APARATO: SUBSCRIBER REGISTRY MANAGER (V8.0 - ROUND ROBIN)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: CENSO EN RAM DE SUSCRIPTORES Y ROTACIÓN JUSTA
 *
 * # Logic:
 * Lectura dominante: los despachadores consultan en cada tick; las
 * escrituras (alta, baja, refresco desde el Ledger) son raras. Un
 * RwLock global con shards por categoría basta; la serialización por
 * (categoría, url) ocurre de forma natural bajo el cerrojo de
 * escritura.
 * =================================================================
 */

use graphline_domain_models::{
    EventCategory, ServiceVersion, SubscriberDescriptor, SubscriberId, SubscriberUrl,
};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{error, info};

/// Miembro activo del censo de una categoría.
#[derive(Debug, Clone)]
pub struct RegisteredSubscriber {
    pub url: SubscriberUrl,
    pub id: SubscriberId,
    pub version: ServiceVersion,
    pub capacity: Option<i64>,
}

/// Shard de una categoría con su cursor de rotación.
#[derive(Debug, Default)]
struct CategoryShard {
    members: Vec<RegisteredSubscriber>,
    rotation_cursor: usize,
}

#[derive(Default)]
pub struct SubscriberRegistryManager {
    category_shards: RwLock<HashMap<EventCategory, CategoryShard>>,
}

impl SubscriberRegistryManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alta o refresco idempotente de un miembro.
    pub fn upsert(
        &self,
        category: EventCategory,
        descriptor: &SubscriberDescriptor,
        capacity: Option<i64>,
    ) {
        match self.category_shards.write() {
            Ok(mut shards_guard) => {
                let shard = shards_guard.entry(category).or_default();
                let fresh_member = RegisteredSubscriber {
                    url: descriptor.url.clone(),
                    id: descriptor.id.clone(),
                    version: descriptor.version.clone(),
                    capacity,
                };

                match shard.members.iter_mut().find(|member| member.url == descriptor.url) {
                    Some(existing_member) => *existing_member = fresh_member,
                    None => {
                        info!(
                            "🤝 [REGISTRY]: Subscriber [{}] joined category [{}].",
                            descriptor.url, category
                        );
                        shard.members.push(fresh_member);
                    }
                }
            }
            Err(lock_poison_fault) => {
                error!("💀 [REGISTRY_FATAL]: Registry lock poisoned: {}", lock_poison_fault);
            }
        }
    }

    /// Baja inmediata de un miembro (suscriptor perdido o evictado).
    pub fn remove(&self, category: EventCategory, subscriber_url: &SubscriberUrl) {
        if let Ok(mut shards_guard) = self.category_shards.write() {
            if let Some(shard) = shards_guard.get_mut(&category) {
                shard.members.retain(|member| &member.url != subscriber_url);
            }
        }
    }

    /// Reemplazo completo del shard desde el censo persistente.
    pub fn replace_category(&self, category: EventCategory, members: Vec<RegisteredSubscriber>) {
        if let Ok(mut shards_guard) = self.category_shards.write() {
            let shard = shards_guard.entry(category).or_default();
            shard.members = members;
            if shard.rotation_cursor >= shard.members.len() {
                shard.rotation_cursor = 0;
            }
        }
    }

    #[must_use]
    pub fn member_count(&self, category: EventCategory) -> usize {
        self.category_shards
            .read()
            .map(|shards_guard| {
                shards_guard
                    .get(&category)
                    .map_or(0, |shard| shard.members.len())
            })
            .unwrap_or(0)
    }

    /**
     * Rotación round-robin restringida a miembros bajo su cupo.
     * `occupancy` refleja las entregas en vuelo por suscriptor.
     */
    #[must_use]
    pub fn next_round_robin(
        &self,
        category: EventCategory,
        occupancy: &HashMap<SubscriberUrl, i64>,
    ) -> Option<RegisteredSubscriber> {
        let mut shards_guard = self.category_shards.write().ok()?;
        let shard = shards_guard.get_mut(&category)?;

        if shard.members.is_empty() {
            return None;
        }

        let member_count = shard.members.len();
        for rotation_step in 0..member_count {
            let candidate_index = (shard.rotation_cursor + rotation_step) % member_count;
            let candidate = &shard.members[candidate_index];

            let in_flight = occupancy.get(&candidate.url).copied().unwrap_or(0);
            let under_capacity = match candidate.capacity {
                Some(declared_capacity) => in_flight < declared_capacity,
                None => true,
            };

            if under_capacity {
                shard.rotation_cursor = (candidate_index + 1) % member_count;
                return Some(candidate.clone());
            }
        }

        None
    }

    /// Instantánea para el endpoint de diagnóstico.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Vec<String>> {
        let mut registry_snapshot = HashMap::new();

        if let Ok(shards_guard) = self.category_shards.read() {
            for (category, shard) in shards_guard.iter() {
                registry_snapshot.insert(
                    category.as_str().to_string(),
                    shard
                        .members
                        .iter()
                        .map(|member| member.url.as_str().to_string())
                        .collect(),
                );
            }
        }

        registry_snapshot
    }
}
