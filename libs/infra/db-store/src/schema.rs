// [libs/infra/db-store/src/schema.rs]
/*!
 * =================================================================
 * APARATO: EVENT LEDGER SCHEMA (V11.0 - EVENT FABRIC)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. COMPOUND IDENTITY: La llave primaria de 'events' es el par
 *    (event_id, project_id); el mismo commit puede existir en forks.
 * 2. DISPATCH ACCELERATION: Índices sobre (status, execution_date) y
 *    (project_id, event_date) para la selección de candidatos.
 * 3. IDEMPOTENCIA: CREATE IF NOT EXISTS en todos los estratos para
 *    migraciones en caliente.
 * =================================================================
 */

use crate::errors::StoreError;
use libsql::Connection;
use tracing::{debug, info, instrument};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 * Define las entidades base del log de eventos y su fabric de despacho.
 */
const LEDGER_TABLES: &[(&str, &str)] = &[
    (
        "TABLE_PROJECTS",
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            project_id INTEGER PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE
        );
    "#,
    ),
    (
        "TABLE_EVENTS",
        r#"
        CREATE TABLE IF NOT EXISTS events (
            event_id TEXT NOT NULL,
            project_id INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'NEW',
            event_date TEXT NOT NULL,
            created_date TEXT NOT NULL,
            execution_date TEXT NOT NULL,
            batch_date TEXT NOT NULL,
            message TEXT,
            payload BLOB,
            PRIMARY KEY (event_id, project_id)
        );
    "#,
    ),
    (
        "TABLE_PROCESSING_TIMES",
        r#"
        CREATE TABLE IF NOT EXISTS processing_times (
            event_id TEXT NOT NULL,
            project_id INTEGER NOT NULL,
            status TEXT NOT NULL,
            duration_millis INTEGER NOT NULL,
            PRIMARY KEY (event_id, project_id, status)
        );
    "#,
    ),
    (
        "TABLE_EVENT_DELIVERIES",
        r#"
        CREATE TABLE IF NOT EXISTS event_deliveries (
            event_id TEXT NOT NULL,
            project_id INTEGER NOT NULL,
            delivery_id TEXT NOT NULL,
            subscriber_url TEXT NOT NULL,
            category TEXT NOT NULL,
            registered_at TEXT NOT NULL,
            PRIMARY KEY (event_id, project_id)
        );
    "#,
    ),
    (
        "TABLE_SUBSCRIBERS",
        r#"
        CREATE TABLE IF NOT EXISTS subscribers (
            category TEXT NOT NULL,
            subscriber_url TEXT NOT NULL,
            subscriber_id TEXT NOT NULL,
            subscriber_version TEXT NOT NULL,
            source_url TEXT NOT NULL,
            capacity INTEGER,
            last_seen TEXT NOT NULL,
            PRIMARY KEY (category, subscriber_url)
        );
    "#,
    ),
    (
        "TABLE_PROJECT_SYNC_TIMES",
        r#"
        CREATE TABLE IF NOT EXISTS project_sync_times (
            project_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            last_sync TEXT NOT NULL,
            PRIMARY KEY (project_id, category)
        );
    "#,
    ),
    (
        "TABLE_TS_MIGRATIONS",
        r#"
        CREATE TABLE IF NOT EXISTS ts_migrations (
            subscriber_url TEXT NOT NULL,
            subscriber_version TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'NEW',
            change_date TEXT NOT NULL,
            message TEXT,
            PRIMARY KEY (subscriber_url, subscriber_version)
        );
    "#,
    ),
];

/**
 * ESTRATO 2: ACELERACIÓN (Índices de Despacho)
 * Rutas de acceso calientes de los productores y del segador de zombies.
 */
const DISPATCH_INDEXES: &[(&str, &str)] = &[
    (
        "IDX_EVENTS_STATUS_EXECUTION",
        "CREATE INDEX IF NOT EXISTS idx_events_status_execution ON events (status, execution_date);",
    ),
    (
        "IDX_EVENTS_PROJECT_DATE",
        "CREATE INDEX IF NOT EXISTS idx_events_project_date ON events (project_id, event_date);",
    ),
    (
        "IDX_DELIVERIES_SUBSCRIBER",
        "CREATE INDEX IF NOT EXISTS idx_deliveries_subscriber ON event_deliveries (subscriber_url);",
    ),
    (
        "IDX_MIGRATIONS_VERSION",
        "CREATE INDEX IF NOT EXISTS idx_migrations_version ON ts_migrations (subscriber_version, status);",
    ),
];

/**
 * Aplica el esquema completo del Ledger de forma idempotente.
 *
 * # Errors:
 * - `QueryError`: Si el motor rechaza una sentencia de génesis.
 */
#[instrument(skip(ledger_connection))]
pub async fn apply_full_event_schema(ledger_connection: &Connection) -> Result<(), StoreError> {
    for (table_label, genesis_statement) in LEDGER_TABLES {
        debug!("🧱 [SCHEMA]: Solidifying {}", table_label);
        ledger_connection.execute(genesis_statement, ()).await?;
    }

    for (index_label, acceleration_statement) in DISPATCH_INDEXES {
        debug!("⚡ [SCHEMA]: Accelerating {}", index_label);
        ledger_connection.execute(acceleration_statement, ()).await?;
    }

    info!("🏛️  [SCHEMA]: Event ledger strata levelized ({} tables).", LEDGER_TABLES.len());
    Ok(())
}
