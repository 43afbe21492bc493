// [apps/event-log/src/lib.rs]
/*!
 * =================================================================
 * APARATO: EVENT LOG LIBRARY ROOT (V8.0 - SOVEREIGN AUTHORITY)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN SUPREMA DEL ÁRBOL DE MÓDULOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. MODULE HIERARCHY HARDENING: Autoridad única de módulos para que
 *    'crate::' resuelva de forma determinista en librería y binario.
 * 2. PUBLIC INTERFACE: Expone 'prelude' para la ignición mínima del
 *    Kernel desde 'main.rs' y desde el Proving Grounds.
 * =================================================================
 */

// --- ESTRATO DE DATOS Y ESTADO (L1-APP) ---
/// Gestor del sistema nervioso central del Event Log.
pub mod state;

// --- ESTRATO DE TRANSPORTE Y ACCIÓN ---
/// Adaptadores de entrada para ráfagas HTTP.
pub mod handlers;
/// Núcleo de mando y control para la ignición de servicios.
pub mod kernel;
/// El túnel de mando: definición de rutas y topología de red.
pub mod routes;

// --- ESTRATO DE DAEMONS ---
/// Productores, despachador, segador y coordinación de migraciones.
pub mod services;

/**
 * PRELUDIO DEL EVENT LOG
 *
 * Re-exportación estratégica de los componentes de ignición mínima.
 */
pub mod prelude {
    pub use crate::kernel::EventLogKernel;
    pub use crate::routes::create_sovereign_router;
    pub use crate::state::AppState;
}
