// [libs/infra/db-store/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY ACCESS MATRIX (V11.0 - TOPOLOGY MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE SUBSISTEMAS DE PERSISTENCIA
 *
 * # Mathematical Proof (Modular Encapsulation):
 * El barrel file actúa como interfaz galvánica: los sub-módulos
 * permanecen aislados y solo las estructuras de autoridad
 * (Repositories) se exponen al exterior.
 * =================================================================
 */

// --- ESTRATO 1: EL LOG DE EVENTOS ---

/// Ciclo de vida completo del evento: upsert, CAS, promoción, zombies.
pub mod event;
/// Rastro de entregas en vuelo (quién posee qué).
pub mod delivery;

// --- ESTRATO 2: TOPOLOGÍA DE PROYECTOS Y SUSCRIPTORES ---

/// Proyectos y sus slugs inmutables.
pub mod project;
/// Registro persistente de suscriptores por categoría.
pub mod subscriber;
/// Watermarks de sincronización por (proyecto, categoría).
pub mod sync_time;

// --- ESTRATO 3: COORDINACIÓN DE MIGRACIONES ---

/// Protocolo single-winner de migraciones del triples store.
pub mod migration;
