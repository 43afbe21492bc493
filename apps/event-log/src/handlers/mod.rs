// [apps/event-log/src/handlers/mod.rs]
/*!
 * =================================================================
 * APARATO: HANDLERS BARREL (V8.0 - API ADAPTERS)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN DE ADAPTADORES HTTP
 * =================================================================
 */

/// Diagnóstico operacional (gauges y censo de suscriptores).
pub mod diagnostics;
/// Ingesta de eventos: commit-sync, cambios de estado, migraciones.
pub mod events;
/// Administración de proyectos (purga en cascada).
pub mod projects;
/// Protocolo de alta y renovación de suscriptores.
pub mod subscriptions;
