// [libs/infra/db-store/src/repositories/migration/queries.rs]
/*!
 * =================================================================
 * APARATO: TS MIGRATION SQL STORE (V10.0 - SINGLE WINNER)
 * CLASIFICACIÓN: INFRASTRUCTURE SQL (ESTRATO L3)
 * RESPONSABILIDAD: SENTENCIAS DEL PROTOCOLO DE MIGRACIÓN
 *
 * # Mathematical Proof (At-Most-One Migration):
 * El CAS hacia SENT está condicionado a que la fila no esté ya en SENT
 * vigente. El conteo posterior de filas SENT por versión dentro de la
 * misma transacción detecta al segundo ganador y fuerza el rollback,
 * garantizando a lo sumo una migración concurrente por versión.
 * =================================================================
 */

/// Registra la fila del suscriptor migrador si aún no existe.
pub const REGISTER_MIGRATION_ROW: &str = r#"
    INSERT OR IGNORE INTO ts_migrations (subscriber_url, subscriber_version, status, change_date)
    VALUES (?1, ?2, 'NEW', ?3)
"#;

/// Versión con el cambio más reciente: define la versión vigente V.
pub const FIND_LATEST_VERSION: &str = r#"
    SELECT subscriber_version FROM ts_migrations
    ORDER BY change_date DESC
    LIMIT 1
"#;

/// ¿Existe una fila DONE para la versión vigente?
pub const COUNT_DONE_FOR_VERSION: &str = r#"
    SELECT COUNT(*) FROM ts_migrations
    WHERE subscriber_version = ?1 AND status = 'DONE'
"#;

/// ¿Existe un SENT vigente (dentro del timeout) para la versión?
pub const COUNT_FRESH_SENT_FOR_VERSION: &str = r#"
    SELECT COUNT(*) FROM ts_migrations
    WHERE subscriber_version = ?1 AND status = 'SENT' AND change_date >= ?2
"#;

/**
 * Fila elegible más reciente para despachar: NEW, o fallo recuperable
 * ya enfriado, o SENT expirado.
 */
pub const FIND_ELIGIBLE_ROW: &str = r#"
    SELECT subscriber_url FROM ts_migrations
    WHERE subscriber_version = ?1
      AND (status = 'NEW'
           OR (status = 'RECOVERABLE_FAILURE' AND change_date <= ?2)
           OR (status = 'SENT' AND change_date < ?3))
    ORDER BY change_date DESC
    LIMIT 1
"#;

/// CAS hacia SENT condicionado a no pisar un SENT vigente.
pub const CLAIM_MIGRATION: &str = r#"
    UPDATE ts_migrations
    SET status = 'SENT', change_date = ?3, message = NULL
    WHERE subscriber_url = ?1 AND subscriber_version = ?2
      AND (status != 'SENT' OR change_date < ?4)
"#;

/// Conteo post-CAS de ganadores simultáneos (distintos suscriptores).
pub const COUNT_SENT_SUBSCRIBERS_FOR_VERSION: &str = r#"
    SELECT COUNT(DISTINCT subscriber_url) FROM ts_migrations
    WHERE subscriber_version = ?1 AND status = 'SENT' AND change_date >= ?2
"#;

/// Sella el desenlace reportado por el worker migrador.
pub const RECORD_OUTCOME: &str = r#"
    UPDATE ts_migrations
    SET status = ?3, change_date = ?4, message = ?5
    WHERE subscriber_url = ?1 AND subscriber_version = ?2
"#;

/// Inspección de una fila concreta (tests y diagnósticos).
pub const FIND_ROW: &str = r#"
    SELECT status, change_date, message FROM ts_migrations
    WHERE subscriber_url = ?1 AND subscriber_version = ?2
"#;
