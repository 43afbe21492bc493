// [libs/domain/models-rs/src/subscription.rs]
/*!
 * =================================================================
 * APARATO: SUBSCRIPTION CONTRACTS (V9.0 - EVENT FABRIC)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: PROTOCOLO DE ALTA Y RENOVACIÓN DE SUSCRIPTORES
 *
 * # Logic:
 * La petición es idempotente: el mismo payload re-enviado en cada
 * ciclo de renovación refresca `last_seen` sin duplicar filas.
 * =================================================================
 */

use crate::identifiers::{ServiceVersion, SubscriberId, SubscriberUrl};
use serde::{Deserialize, Serialize};

/// Descriptor del worker que solicita eventos de una categoría.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberDescriptor {
    /// Endpoint HTTP donde el worker recibe sobres.
    pub url: SubscriberUrl,
    /// Identificador lógico estable del worker.
    pub id: SubscriberId,
    /// Versión del servicio; llave del protocolo de migración.
    pub version: ServiceVersion,
}

/// Cuerpo de `POST /subscriptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPayload {
    /// Nombre de cable de la categoría solicitada; validado contra el catálogo.
    pub category_name: String,
    /// Identidad del suscriptor.
    pub subscriber: SubscriberDescriptor,
    /// Cupo máximo de eventos en vuelo que el worker acepta a la vez.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

impl SubscriptionPayload {
    /// Una versión en blanco equivale a una versión desconocida: se rechaza.
    #[must_use]
    pub fn version_is_known(&self) -> bool {
        !self.subscriber.version.as_str().trim().is_empty()
    }
}
