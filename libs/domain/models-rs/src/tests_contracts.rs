// [libs/domain/models-rs/src/tests_contracts.rs]
/**
 * =================================================================
 * APARATO: DOMAIN CONTRACT PARITY TEST (V9.0 - WIRE EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-MODELS)
 * RESPONSABILIDAD: CERTIFICACIÓN DE PARIDAD JSON DE LOS CONTRATOS
 *
 * # Logic:
 * Los suscriptores externos dependen de la forma exacta del cable:
 * nombres camelCase, tags de subCategory y estados SCREAMING_SNAKE.
 * Cualquier deriva en serde rompe flotas enteras de workers; estos
 * tests congelan la forma observable.
 * =================================================================
 */
