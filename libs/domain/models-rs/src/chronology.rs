// [libs/domain/models-rs/src/chronology.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN CHRONOLOGY (V9.1 - CLOCK SKEW SHIELD)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: MARCAS TEMPORALES CON INVARIANTES DE DOMINIO
 *
 * # Logic:
 * El tiempo de dominio (EventDate) proviene del commit del Forge y NO
 * es de confianza: un reloj desviado en la plataforma externa podría
 * proyectar eventos hacia el futuro y congelar la selección del
 * productor. La construcción aplica una pinza de +24h sobre el reloj
 * local del backbone.
 * =================================================================
 */

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Ventana máxima permitida hacia el futuro para el tiempo de dominio.
const MAXIMUM_FUTURE_SKEW_HOURS: i64 = 24;

/// Tiempo de dominio del evento (instante del commit reportado por el Forge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventDate(pub DateTime<Utc>);

/// Instante más temprano en el que el evento es elegible para despacho.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionDate(pub DateTime<Utc>);

/// Agrupador de eventos creados en la misma ráfaga de ingesta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchDate(pub DateTime<Utc>);

impl EventDate {
    /**
     * Construye un tiempo de dominio aplicando la pinza anti-desviación.
     *
     * Cualquier instante reportado más de 24 horas en el futuro del reloj
     * local queda recortado a `now + 24h`. Candidato a revisión si el
     * Forge certifica relojes NTP estrictos.
     */
    #[must_use]
    pub fn clamped(reported_instant: DateTime<Utc>, local_now: DateTime<Utc>) -> Self {
        let future_ceiling = local_now + Duration::hours(MAXIMUM_FUTURE_SKEW_HOURS);
        if reported_instant > future_ceiling {
            Self(future_ceiling)
        } else {
            Self(reported_instant)
        }
    }

    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

impl ExecutionDate {
    /**
     * Construye la fecha de elegibilidad garantizando el invariante
     * `execution_date >= created_date`.
     */
    #[must_use]
    pub fn not_before_creation(candidate: DateTime<Utc>, created_date: DateTime<Utc>) -> Self {
        if candidate < created_date {
            Self(created_date)
        } else {
            Self(candidate)
        }
    }

    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

impl BatchDate {
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}
