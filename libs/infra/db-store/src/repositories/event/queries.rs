// [libs/infra/db-store/src/repositories/event/queries.rs]
/*!
 * =================================================================
 * APARATO: EVENT LEDGER SQL STORE (V11.0 - DISPATCH GUARDED)
 * CLASIFICACIÓN: INFRASTRUCTURE SQL (ESTRATO L3)
 * RESPONSABILIDAD: SENTENCIAS ATÓMICAS DEL LOG DE EVENTOS
 *
 * # Mathematical Proof (ACID Claim Exclusivity):
 * Todo reclamo de despacho usa guardias de estado (`WHERE status IN
 * (...)`) más una guardia de no-concurrencia por proyecto dentro de la
 * misma sentencia UPDATE. Dos productores concurrentes nunca toman el
 * mismo evento: el perdedor afecta cero filas y cede el turno.
 * =================================================================
 */

// --- ESTRATO DE IGNICIÓN (UPSERT) ---

/// Crea el proyecto de forma perezosa; el slug original es inmutable.
pub const ENSURE_PROJECT: &str = r#"
    INSERT OR IGNORE INTO projects (project_id, slug) VALUES (?1, ?2)
"#;

/// Lee el estado actual del evento para decidir la rama del upsert.
pub const FIND_STATUS: &str = r#"
    SELECT status FROM events WHERE event_id = ?1 AND project_id = ?2
"#;

/// Inserta un evento fresco en estado NEW.
pub const INSERT_NEW_EVENT: &str = r#"
    INSERT INTO events (
        event_id, project_id, status, event_date,
        created_date, execution_date, batch_date
    ) VALUES (?1, ?2, 'NEW', ?3, ?4, ?5, ?6)
"#;

/// Reinicia un evento re-notificado a NEW (solo estados re-arrancables).
pub const RESET_EVENT_TO_NEW: &str = r#"
    UPDATE events
    SET status = 'NEW',
        message = NULL,
        execution_date = ?3,
        batch_date = ?4
    WHERE event_id = ?1 AND project_id = ?2
      AND status IN ('SKIPPED', 'NEW', 'GENERATION_RECOVERABLE_FAILURE')
"#;

// --- ESTRATO DE LECTURA ---

/// Hidrata el agregado completo de un evento.
pub const FIND_EVENT: &str = r#"
    SELECT e.event_id, e.project_id, p.slug, e.status, e.event_date,
           e.created_date, e.execution_date, e.batch_date, e.message, e.payload
    FROM events e
    JOIN projects p ON p.project_id = e.project_id
    WHERE e.event_id = ?1 AND e.project_id = ?2
"#;

/// Enumera los eventos de un proyecto en orden de dominio.
pub const FIND_PROJECT_EVENTS: &str = r#"
    SELECT e.event_id, e.project_id, p.slug, e.status, e.event_date,
           e.created_date, e.execution_date, e.batch_date, e.message, e.payload
    FROM events e
    JOIN projects p ON p.project_id = e.project_id
    WHERE e.project_id = ?1
    ORDER BY e.event_date ASC
"#;

/// Tiempos de fase registrados para un evento.
pub const FIND_PROCESSING_TIMES: &str = r#"
    SELECT status, duration_millis FROM processing_times
    WHERE event_id = ?1 AND project_id = ?2
"#;

/// Conteo de eventos en un estado (capacity query de los productores).
pub const COUNT_IN_STATUS: &str = r#"
    SELECT COUNT(*) FROM events WHERE status = ?1
"#;

// --- ESTRATO DE SELECCIÓN DE CANDIDATOS (PRODUCTORES) ---

/**
 * Proyectos con al menos un evento elegible para generación.
 * Por proyecto se considera solo el evento elegible más reciente, y se
 * exige que ningún evento estrictamente posterior haya avanzado ya a
 * una fase superior (causalidad por proyecto).
 */
pub const FIND_GENERATION_CANDIDATES: &str = r#"
    SELECT p.project_id, p.slug, c.latest_eligible_date, c.occupancy
    FROM projects p
    JOIN (
        SELECT e.project_id AS candidate_project_id,
               MAX(e.event_date) AS latest_eligible_date,
               (SELECT COUNT(*) FROM events oe
                 WHERE oe.project_id = e.project_id
                   AND oe.status = 'GENERATING_TRIPLES') AS occupancy
        FROM events e
        WHERE e.status IN ('NEW', 'GENERATION_RECOVERABLE_FAILURE')
          AND e.execution_date <= ?1
        GROUP BY e.project_id
    ) c ON c.candidate_project_id = p.project_id
    WHERE NOT EXISTS (
        SELECT 1 FROM events le
        WHERE le.project_id = c.candidate_project_id
          AND le.event_date > c.latest_eligible_date
          AND le.status IN ('TRIPLES_GENERATED', 'TRANSFORMING_TRIPLES', 'TRIPLES_STORE',
                            'TRANSFORMATION_RECOVERABLE_FAILURE',
                            'TRANSFORMATION_NON_RECOVERABLE_FAILURE')
    )
    ORDER BY c.latest_eligible_date DESC
    LIMIT ?2
"#;

/// Proyectos con al menos un evento elegible para transformación.
pub const FIND_TRANSFORMATION_CANDIDATES: &str = r#"
    SELECT p.project_id, p.slug, c.latest_eligible_date, c.occupancy
    FROM projects p
    JOIN (
        SELECT e.project_id AS candidate_project_id,
               MAX(e.event_date) AS latest_eligible_date,
               (SELECT COUNT(*) FROM events oe
                 WHERE oe.project_id = e.project_id
                   AND oe.status = 'TRANSFORMING_TRIPLES') AS occupancy
        FROM events e
        WHERE e.status IN ('TRIPLES_GENERATED', 'TRANSFORMATION_RECOVERABLE_FAILURE')
          AND e.execution_date <= ?1
        GROUP BY e.project_id
    ) c ON c.candidate_project_id = p.project_id
    WHERE NOT EXISTS (
        SELECT 1 FROM events le
        WHERE le.project_id = c.candidate_project_id
          AND le.event_date > c.latest_eligible_date
          AND le.status = 'TRIPLES_STORE'
    )
    ORDER BY c.latest_eligible_date DESC
    LIMIT ?2
"#;

/// Evento elegible más reciente de un proyecto para generación.
pub const FIND_NEWEST_GENERATION_EVENT: &str = r#"
    SELECT event_id, event_date FROM events
    WHERE project_id = ?1
      AND status IN ('NEW', 'GENERATION_RECOVERABLE_FAILURE')
      AND execution_date <= ?2
    ORDER BY event_date DESC
    LIMIT 1
"#;

/// Evento elegible más reciente de un proyecto para transformación.
pub const FIND_NEWEST_TRANSFORMATION_EVENT: &str = r#"
    SELECT event_id, event_date, payload FROM events
    WHERE project_id = ?1
      AND status IN ('TRIPLES_GENERATED', 'TRANSFORMATION_RECOVERABLE_FAILURE')
      AND execution_date <= ?2
    ORDER BY event_date DESC
    LIMIT 1
"#;

/// Evento más antiguo a la espera de borrado cuyo proyecto está ocioso.
pub const FIND_OLDEST_DELETION_EVENT: &str = r#"
    SELECT e.event_id, e.event_date, e.project_id, p.slug
    FROM events e
    JOIN projects p ON p.project_id = e.project_id
    WHERE e.status = 'AWAITING_DELETION'
      AND e.execution_date <= ?1
      AND NOT EXISTS (
          SELECT 1 FROM events de
          WHERE de.project_id = e.project_id AND de.status = 'DELETING'
      )
    ORDER BY e.event_date ASC
    LIMIT 1
"#;

/**
 * Reclamo atómico de despacho: CAS del estado más guardia de
 * no-concurrencia por proyecto en la misma sentencia.
 */
pub const CLAIM_FOR_GENERATION: &str = r#"
    UPDATE events
    SET status = 'GENERATING_TRIPLES', message = NULL, execution_date = ?3
    WHERE event_id = ?1 AND project_id = ?2
      AND status IN ('NEW', 'GENERATION_RECOVERABLE_FAILURE')
      AND NOT EXISTS (
          SELECT 1 FROM events pe
          WHERE pe.project_id = ?2 AND pe.status = 'GENERATING_TRIPLES'
      )
"#;

pub const CLAIM_FOR_TRANSFORMATION: &str = r#"
    UPDATE events
    SET status = 'TRANSFORMING_TRIPLES', message = NULL, execution_date = ?3
    WHERE event_id = ?1 AND project_id = ?2
      AND status IN ('TRIPLES_GENERATED', 'TRANSFORMATION_RECOVERABLE_FAILURE')
      AND NOT EXISTS (
          SELECT 1 FROM events pe
          WHERE pe.project_id = ?2 AND pe.status = 'TRANSFORMING_TRIPLES'
      )
"#;

pub const CLAIM_FOR_DELETION: &str = r#"
    UPDATE events
    SET status = 'DELETING', message = NULL, execution_date = ?3
    WHERE event_id = ?1 AND project_id = ?2
      AND status = 'AWAITING_DELETION'
      AND NOT EXISTS (
          SELECT 1 FROM events pe
          WHERE pe.project_id = ?2 AND pe.status = 'DELETING'
      )
"#;

// --- ESTRATO DE PROMOCIÓN EN LOTE ---

/**
 * Promueve a TRIPLES_STORE todo evento del proyecto con fecha de dominio
 * no posterior a la del evento certificado que siga en fase temprana.
 * Los eventos estrictamente posteriores no se tocan.
 */
pub const PROMOTE_BATCH_TO_TRIPLES_STORE: &str = r#"
    UPDATE events
    SET status = 'TRIPLES_STORE', message = NULL
    WHERE project_id = ?1
      AND event_date <= ?2
      AND status IN ('NEW', 'GENERATING_TRIPLES', 'TRIPLES_GENERATED',
                     'TRANSFORMING_TRIPLES', 'GENERATION_RECOVERABLE_FAILURE',
                     'TRANSFORMATION_RECOVERABLE_FAILURE')
"#;

/// Limpia las entregas de los eventos promovidos en lote.
pub const PURGE_BATCH_DELIVERIES: &str = r#"
    DELETE FROM event_deliveries
    WHERE project_id = ?1
      AND event_id IN (
          SELECT event_id FROM events
          WHERE project_id = ?1 AND status = 'TRIPLES_STORE'
      )
"#;

// --- ESTRATO DE TRANSICIONES MASIVAS ---

/// Retorna a NEW todos los eventos no terminales del proyecto.
pub const PROJECT_EVENTS_TO_NEW: &str = r#"
    UPDATE events
    SET status = 'NEW', message = NULL, payload = NULL, execution_date = ?2
    WHERE project_id = ?1
      AND status IN ('GENERATING_TRIPLES', 'TRIPLES_GENERATED', 'TRANSFORMING_TRIPLES',
                     'GENERATION_RECOVERABLE_FAILURE', 'TRANSFORMATION_RECOVERABLE_FAILURE',
                     'AWAITING_DELETION', 'DELETING')
"#;

/// Re-encola la transformación completa del proyecto (redo).
pub const REDO_PROJECT_TRANSFORMATION: &str = r#"
    UPDATE events
    SET status = 'TRIPLES_GENERATED', message = NULL, execution_date = ?2
    WHERE project_id = ?1
      AND status = 'TRIPLES_STORE'
      AND payload IS NOT NULL
"#;

/// Purga todas las entregas registradas para un proyecto.
pub const PURGE_PROJECT_DELIVERIES: &str = r#"
    DELETE FROM event_deliveries WHERE project_id = ?1
"#;

// --- ESTRATO DE CAZA DE ZOMBIES ---

/**
 * Eventos en estado de procesamiento cuya entrega falta, apunta a un
 * suscriptor desaparecido, o cuya ejecución superó el periodo de gracia.
 */
pub const FIND_ZOMBIE_EVENTS: &str = r#"
    SELECT e.event_id, e.project_id, e.status
    FROM events e
    LEFT JOIN event_deliveries d
           ON d.event_id = e.event_id AND d.project_id = e.project_id
    LEFT JOIN subscribers s
           ON s.subscriber_url = d.subscriber_url AND s.category = d.category
    WHERE e.status IN ('GENERATING_TRIPLES', 'TRANSFORMING_TRIPLES', 'DELETING')
      AND (e.message IS NULL OR e.message != 'ZOMBIE_CHASING_EVENT')
      AND (d.delivery_id IS NULL
           OR s.subscriber_url IS NULL
           OR e.execution_date < ?1)
    LIMIT ?2
"#;

/**
 * Rescate condicional: siembra el centinela y retrocede el estado. La
 * guardia sobre el mensaje impide rescates repetidos del mismo evento.
 */
pub const CHASE_ZOMBIE: &str = r#"
    UPDATE events
    SET status = ?3, message = 'ZOMBIE_CHASING_EVENT', execution_date = ?4
    WHERE event_id = ?1 AND project_id = ?2
      AND status = ?5
      AND (message IS NULL OR message != 'ZOMBIE_CHASING_EVENT')
"#;

// --- ESTRATO DE LIMPIEZA DE PROYECTO ---

pub const DELETE_PROJECT_PROCESSING_TIMES: &str = r#"
    DELETE FROM processing_times WHERE project_id = ?1
"#;

pub const DELETE_PROJECT_EVENTS: &str = r#"
    DELETE FROM events WHERE project_id = ?1
"#;

pub const DELETE_PROJECT_SYNC_TIMES: &str = r#"
    DELETE FROM project_sync_times WHERE project_id = ?1
"#;

pub const DELETE_PROJECT_ROW: &str = r#"
    DELETE FROM projects WHERE project_id = ?1
"#;

// --- ESTRATO DE CENSO (GAUGES) ---

/// Censo global de estados por proyecto (reconstrucción de gauges).
pub const STATUS_CENSUS: &str = r#"
    SELECT p.slug, e.status, COUNT(*)
    FROM events e
    JOIN projects p ON p.project_id = e.project_id
    GROUP BY p.slug, e.status
"#;

/// Censo de estados de un solo proyecto (refresco tras lotes).
pub const PROJECT_STATUS_CENSUS: &str = r#"
    SELECT p.slug, e.status, COUNT(*)
    FROM events e
    JOIN projects p ON p.project_id = e.project_id
    WHERE e.project_id = ?1
    GROUP BY p.slug, e.status
"#;

// --- ESTRATO DE MUTACIÓN PUNTUAL ---

/// Registro de tiempo de fase (idempotente por (evento, estado)).
pub const APPEND_PROCESSING_TIME: &str = r#"
    INSERT OR REPLACE INTO processing_times (event_id, project_id, status, duration_millis)
    VALUES (?1, ?2, ?3, ?4)
"#;

/// Borra la entrega en vuelo de un evento.
pub const DELETE_EVENT_DELIVERY: &str = r#"
    DELETE FROM event_deliveries WHERE event_id = ?1 AND project_id = ?2
"#;
