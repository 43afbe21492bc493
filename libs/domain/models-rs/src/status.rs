// [libs/domain/models-rs/src/status.rs]
/*!
 * =================================================================
 * APARATO: EVENT STATUS STATE MACHINE (V12.0 - TRANSITION SEALED)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: MÁQUINA DE ESTADOS SOBERANA DEL CICLO DE VIDA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TRANSITION AUTHORITY: `can_transition_to` es la única relación de
 *    legalidad; la capa de persistencia añade guardias CAS pero jamás
 *    redefine el grafo.
 * 2. WIRE PARITY: Los nombres SCREAMING_SNAKE del cable son idénticos
 *    a los registrados en el Ledger, eliminando mapeos intermedios.
 *
 * # Mathematical Proof (Acyclic Progress):
 * El grafo solo contiene los ciclos documentados de reintento
 * (recoverable -> processing) y de rollback explícito. Todo otro
 * camino avanza monótonamente hacia un estado terminal.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Estados del ciclo de vida de un evento en el backbone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    New,
    GeneratingTriples,
    TriplesGenerated,
    TransformingTriples,
    TriplesStore,
    Skipped,
    GenerationRecoverableFailure,
    GenerationNonRecoverableFailure,
    TransformationRecoverableFailure,
    TransformationNonRecoverableFailure,
    AwaitingDeletion,
    Deleting,
}

impl EventStatus {
    /// Nombre de cable / Ledger del estado.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::GeneratingTriples => "GENERATING_TRIPLES",
            Self::TriplesGenerated => "TRIPLES_GENERATED",
            Self::TransformingTriples => "TRANSFORMING_TRIPLES",
            Self::TriplesStore => "TRIPLES_STORE",
            Self::Skipped => "SKIPPED",
            Self::GenerationRecoverableFailure => "GENERATION_RECOVERABLE_FAILURE",
            Self::GenerationNonRecoverableFailure => "GENERATION_NON_RECOVERABLE_FAILURE",
            Self::TransformationRecoverableFailure => "TRANSFORMATION_RECOVERABLE_FAILURE",
            Self::TransformationNonRecoverableFailure => "TRANSFORMATION_NON_RECOVERABLE_FAILURE",
            Self::AwaitingDeletion => "AWAITING_DELETION",
            Self::Deleting => "DELETING",
        }
    }

    /// Decodifica el nombre de cable registrado en el Ledger.
    #[must_use]
    pub fn from_wire(wire_name: &str) -> Option<Self> {
        match wire_name {
            "NEW" => Some(Self::New),
            "GENERATING_TRIPLES" => Some(Self::GeneratingTriples),
            "TRIPLES_GENERATED" => Some(Self::TriplesGenerated),
            "TRANSFORMING_TRIPLES" => Some(Self::TransformingTriples),
            "TRIPLES_STORE" => Some(Self::TriplesStore),
            "SKIPPED" => Some(Self::Skipped),
            "GENERATION_RECOVERABLE_FAILURE" => Some(Self::GenerationRecoverableFailure),
            "GENERATION_NON_RECOVERABLE_FAILURE" => Some(Self::GenerationNonRecoverableFailure),
            "TRANSFORMATION_RECOVERABLE_FAILURE" => Some(Self::TransformationRecoverableFailure),
            "TRANSFORMATION_NON_RECOVERABLE_FAILURE" => {
                Some(Self::TransformationNonRecoverableFailure)
            }
            "AWAITING_DELETION" => Some(Self::AwaitingDeletion),
            "DELETING" => Some(Self::Deleting),
            _ => None,
        }
    }

    /// Estados que nunca vuelven a mutar por sí mismos.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TriplesStore
                | Self::Skipped
                | Self::GenerationNonRecoverableFailure
                | Self::TransformationNonRecoverableFailure
        )
    }

    /// Estados que indican propiedad activa de un suscriptor.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            Self::GeneratingTriples | Self::TransformingTriples | Self::Deleting
        )
    }

    /// Estados de fallo (recuperable o no).
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::GenerationRecoverableFailure
                | Self::GenerationNonRecoverableFailure
                | Self::TransformationRecoverableFailure
                | Self::TransformationNonRecoverableFailure
        )
    }

    /// Estados que exigen la presencia de un payload comprimido.
    #[must_use]
    pub fn requires_payload(&self) -> bool {
        matches!(
            self,
            Self::TriplesGenerated
                | Self::TransformingTriples
                | Self::TransformationRecoverableFailure
        )
    }

    /**
     * Estados que admiten retener un payload. `TRIPLES_STORE` lo admite
     * sin exigirlo: los eventos promovidos en lote llegan sin artefacto.
     */
    #[must_use]
    pub fn may_retain_payload(&self) -> bool {
        self.requires_payload() || matches!(self, Self::TriplesStore)
    }

    /**
     * Estado predecesor al que retorna un evento en vuelo cuando el
     * suscriptor lo abandona (rollback o recuperación de zombies).
     */
    #[must_use]
    pub fn rollback_target(&self) -> Option<Self> {
        match self {
            Self::GeneratingTriples => Some(Self::New),
            Self::TransformingTriples => Some(Self::TriplesGenerated),
            Self::Deleting => Some(Self::AwaitingDeletion),
            _ => None,
        }
    }

    /**
     * Relación de legalidad del grafo de transiciones.
     *
     * # Logic:
     * - Los ciclos permitidos son exactamente los de reintento
     *   (recoverable -> processing) y los rollbacks explícitos.
     * - `AWAITING_DELETION` es alcanzable desde cualquier estado no
     *   relacionado con borrado (limpieza solicitada por el operador).
     * - `TRIPLES_STORE -> TRIPLES_GENERATED` habilita el redo de
     *   transformación de proyecto completo.
     */
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        if next == Self::AwaitingDeletion {
            return !matches!(self, Self::AwaitingDeletion | Self::Deleting);
        }

        match self {
            Self::New => matches!(
                next,
                Self::GeneratingTriples
                    | Self::Skipped
                    | Self::GenerationNonRecoverableFailure
                    | Self::TransformationNonRecoverableFailure
            ),
            Self::GeneratingTriples => matches!(
                next,
                Self::TriplesGenerated
                    | Self::GenerationRecoverableFailure
                    | Self::GenerationNonRecoverableFailure
                    | Self::New
            ),
            Self::TriplesGenerated => matches!(
                next,
                Self::TransformingTriples | Self::TriplesStore | Self::New
            ),
            Self::TransformingTriples => matches!(
                next,
                Self::TriplesStore
                    | Self::TransformationRecoverableFailure
                    | Self::TransformationNonRecoverableFailure
                    | Self::TriplesGenerated
            ),
            Self::GenerationRecoverableFailure => {
                matches!(next, Self::GeneratingTriples | Self::New)
            }
            Self::TransformationRecoverableFailure => {
                matches!(next, Self::TransformingTriples | Self::TriplesGenerated | Self::New)
            }
            Self::TriplesStore => matches!(next, Self::TriplesGenerated),
            Self::Skipped => matches!(next, Self::New),
            Self::AwaitingDeletion => matches!(next, Self::Deleting),
            Self::Deleting => false,
            Self::GenerationNonRecoverableFailure
            | Self::TransformationNonRecoverableFailure => false,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}
