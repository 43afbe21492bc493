// [tests/mirror/libs/infra/event_log_client/project_lock.test.rs]
/**
 * =================================================================
 * APARATO: TS WRITE LOCK TEST (V7.0 - SLUG EXCLUSIVITY)
 * CLASIFICACIÓN: CONCURRENCY EVIDENCE
 * RESPONSABILIDAD: CERTIFICACIÓN DEL CERROJO POR SLUG
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use graphline_domain_models::ProjectSlug;
    use graphline_event_log_client::SlugWriteLockRegistry;
    use std::sync::Arc;

    fn reactor() -> ProjectSlug {
        ProjectSlug("namespace/reactor".into())
    }

    #[tokio::test]
    async fn certify_same_slug_is_exclusive() {
        let registry = SlugWriteLockRegistry::new();

        let held_guard = registry.acquire(&reactor()).await;
        assert!(
            registry.try_acquire(&reactor()).await.is_none(),
            "INTEGRITY_FAULT: two writers on one slug"
        );

        drop(held_guard);
        assert!(registry.try_acquire(&reactor()).await.is_some());
    }

    #[tokio::test]
    async fn certify_distinct_slugs_do_not_contend() {
        let registry = SlugWriteLockRegistry::new();

        let _reactor_guard = registry.acquire(&reactor()).await;
        let other_guard = registry
            .try_acquire(&ProjectSlug("namespace/other".into()))
            .await;

        assert!(other_guard.is_some(), "L3: unrelated slug blocked");
    }

    #[tokio::test]
    async fn certify_waiters_proceed_after_release() {
        let registry = Arc::new(SlugWriteLockRegistry::new());

        let held_guard = registry.acquire(&reactor()).await;

        let waiting_registry = registry.clone();
        let waiter = tokio::spawn(async move {
            // Se desbloquea solo cuando el poseedor suelta el cerrojo.
            let _guard = waiting_registry.acquire(&reactor()).await;
            true
        });

        // El waiter debe seguir pendiente mientras el cerrojo viva.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!waiter.is_finished(), "INTEGRITY_FAULT: waiter bypassed the lock");

        drop(held_guard);
        assert!(waiter.await.expect("FAULT: waiter collapsed"));
    }
}
