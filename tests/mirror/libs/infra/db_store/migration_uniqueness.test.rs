// [tests/mirror/libs/infra/db_store/migration_uniqueness.test.rs]
/**
 * =================================================================
 * APARATO: MIGRATION SINGLE-WINNER TEST (V9.0 - AT MOST ONE)
 * CLASIFICACIÓN: E2E INTEGRATION / LEDGER
 * RESPONSABILIDAD: CERTIFICACIÓN DEL PROTOCOLO DE MIGRACIÓN
 *
 * # Mathematical Proof (At-Most-One):
 * Con una fila NEW para la versión vigente, dos llamadas a
 * next_migration producen exactamente un ganador: la segunda observa
 * el SENT vigente y cede con None.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use graphline_domain_models::{
        MigrationRequestEnvelope, MigrationStatus, MigrationSubCategory, ServiceVersion,
        SubscriberUrl,
    };
    use graphline_infra_db::{MigrationRepository, StoreClient};

    async fn migrations(test_label: &str) -> MigrationRepository {
        let store_client = StoreClient::connect(
            &format!("file:{test_label}?mode=memory&cache=shared"),
            None,
        )
        .await
        .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.");

        MigrationRepository::new(store_client)
    }

    fn worker(url: &str) -> SubscriberUrl {
        SubscriberUrl(url.into())
    }

    fn version() -> ServiceVersion {
        ServiceVersion("1.2.3".into())
    }

    #[tokio::test]
    async fn certify_single_winner_per_version() {
        println!("\n🔍 [AUDIT]: Single-winner migration certification...");
        let migrations = migrations("migration_single_winner").await;

        migrations
            .register_subscriber_version(&worker("http://worker-a:9002/events"), &version())
            .await
            .expect("FAULT: enrollment collapsed");
        migrations
            .register_subscriber_version(&worker("http://worker-b:9002/events"), &version())
            .await
            .expect("FAULT: enrollment collapsed");

        // Primer aspirante: gana y la fila pasa a SENT.
        let first_attempt = migrations
            .next_migration(Utc::now())
            .await
            .expect("FAULT: selection collapsed");
        let elected = first_attempt.expect("L3: no winner elected with NEW rows present");
        assert_eq!(elected.subscriber_version.as_str(), "1.2.3");

        let winner_status = migrations
            .find_row_status(&elected.subscriber_url, &elected.subscriber_version)
            .await
            .expect("FAULT: inspection collapsed");
        assert_eq!(winner_status, Some(MigrationStatus::Sent));

        // Segundo aspirante: observa el SENT vigente y cede.
        let second_attempt = migrations
            .next_migration(Utc::now())
            .await
            .expect("FAULT: selection collapsed");
        assert!(second_attempt.is_none(), "INTEGRITY_FAULT: two concurrent winners");

        println!("   ✅ [VERDICT]: At-most-one migration per version holds.");
    }

    #[tokio::test]
    async fn certify_done_short_circuits_the_version() {
        let migrations = migrations("migration_done_short_circuit").await;
        let worker_url = worker("http://worker-a:9002/events");

        migrations
            .register_subscriber_version(&worker_url, &version())
            .await
            .expect("FAULT: enrollment collapsed");

        let elected = migrations
            .next_migration(Utc::now())
            .await
            .expect("FAULT: selection collapsed")
            .expect("L3: no winner elected");

        migrations
            .record_outcome(&MigrationRequestEnvelope {
                subscriber_url: elected.subscriber_url,
                subscriber_version: elected.subscriber_version,
                sub_category: MigrationSubCategory::ToDone,
                message: None,
            })
            .await
            .expect("FAULT: outcome seal collapsed");

        // Migración completa: nadie más recibe trabajo para la versión.
        assert!(migrations
            .next_migration(Utc::now())
            .await
            .expect("FAULT: selection collapsed")
            .is_none());

        assert_eq!(
            migrations
                .find_row_status(&worker("http://worker-a:9002/events"), &version())
                .await
                .expect("FAULT: inspection collapsed"),
            Some(MigrationStatus::Done)
        );
    }

    #[tokio::test]
    async fn certify_recoverable_failure_cools_before_retry() {
        let migrations = migrations("migration_recoverable_cooling").await;
        let worker_url = worker("http://worker-a:9002/events");

        migrations
            .register_subscriber_version(&worker_url, &version())
            .await
            .expect("FAULT: enrollment collapsed");

        let elected = migrations
            .next_migration(Utc::now())
            .await
            .expect("FAULT: selection collapsed")
            .expect("L3: no winner elected");

        migrations
            .record_outcome(&MigrationRequestEnvelope {
                subscriber_url: elected.subscriber_url,
                subscriber_version: elected.subscriber_version,
                sub_category: MigrationSubCategory::ToRecoverableFailure,
                message: Some("triples store unreachable".into()),
            })
            .await
            .expect("FAULT: outcome seal collapsed");

        // Fallo fresco: el enfriamiento de 30s bloquea el reintento inmediato.
        assert!(migrations
            .next_migration(Utc::now())
            .await
            .expect("FAULT: selection collapsed")
            .is_none());

        // Reloj adelantado más allá del enfriamiento: reintento habilitado.
        let retried = migrations
            .next_migration(Utc::now() + chrono::Duration::seconds(45))
            .await
            .expect("FAULT: selection collapsed");
        assert!(retried.is_some(), "L3: cooled recoverable failure not retried");
    }
}
