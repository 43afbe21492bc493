// [libs/domain/models-rs/src/webhook.rs]
/*!
 * =================================================================
 * APARATO: FORGE WEBHOOK CONTRACTS (V9.0 - PUSH INGRESS)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CUERPOS DE LA NOTIFICACIÓN PUSH Y SU INYECCIÓN
 * =================================================================
 */

use crate::envelope::ProjectReference;
use crate::identifiers::{EventId, ProjectId, ProjectSlug};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proyecto tal como lo describe la notificación push del Forge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushProjectInfo {
    /// Identificador numérico del Forge.
    pub id: ProjectId,
    /// Ruta canónica `namespace/name`.
    pub path_with_namespace: ProjectSlug,
}

/// Cuerpo JSON de `POST /webhooks/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEventPayload {
    /// Hash del commit cabeza tras el push.
    pub after: EventId,
    /// Proyecto que originó la notificación.
    pub project: PushProjectInfo,
}

/// Evento de sincronización inyectado en el log por el Webhook Gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSyncRequest {
    /// Hash del commit que dispara la sincronización.
    pub id: EventId,
    /// Proyecto objetivo.
    pub project: ProjectReference,
    /// Instante del push según el gateway (UTC).
    pub occurred_at: DateTime<Utc>,
}

impl CommitSyncRequest {
    #[must_use]
    pub fn from_push(payload: &PushEventPayload, observed_at: DateTime<Utc>) -> Self {
        Self {
            id: payload.after.clone(),
            project: ProjectReference {
                id: payload.project.id,
                slug: payload.project.path_with_namespace.clone(),
            },
            occurred_at: observed_at,
        }
    }
}
