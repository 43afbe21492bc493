// [libs/domain/models-rs/src/payload.rs]
/*!
 * =================================================================
 * APARATO: ZIPPED PAYLOAD CODEC (V9.0 - GZIP OPAQUE)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: TRANSPORTE OPACO DEL ARTEFACTO JSON-LD
 *
 * # Logic:
 * El backbone jamás inspecciona el artefacto de triples: lo recibe
 * comprimido del generador, lo retiene en el Ledger y lo reenvía al
 * transformador. El códec garantiza la ley `decompress ∘ compress = id`.
 * =================================================================
 */

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadCodecError {
    /// La ráfaga recibida no es un stream gzip íntegro.
    #[error("[L2_PAYLOAD_FAULT]: GZIP_STREAM_CORRUPTED -> {0}")]
    CorruptedStream(String),
}

/// Blob gzip opaco con el artefacto de generación de triples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZippedEventPayload {
    compressed_bytes: Vec<u8>,
}

impl ZippedEventPayload {
    /// Adopta bytes ya comprimidos tal como llegaron del cable o del Ledger.
    #[must_use]
    pub fn from_compressed(compressed_bytes: Vec<u8>) -> Self {
        Self { compressed_bytes }
    }

    /**
     * Comprime un artefacto plano en un blob de transporte.
     *
     * # Errors:
     * - `CorruptedStream`: Si el encoder gzip colapsa (I/O en memoria).
     */
    pub fn compress(plain_bytes: &[u8]) -> Result<Self, PayloadCodecError> {
        let mut gzip_encoder = GzEncoder::new(Vec::new(), Compression::default());
        gzip_encoder
            .write_all(plain_bytes)
            .map_err(|fault| PayloadCodecError::CorruptedStream(fault.to_string()))?;

        let compressed_bytes = gzip_encoder
            .finish()
            .map_err(|fault| PayloadCodecError::CorruptedStream(fault.to_string()))?;

        Ok(Self { compressed_bytes })
    }

    /**
     * Expande el blob a su artefacto plano original.
     *
     * # Errors:
     * - `CorruptedStream`: Si los bytes no forman un stream gzip válido.
     */
    pub fn decompress(&self) -> Result<Vec<u8>, PayloadCodecError> {
        let mut gzip_decoder = GzDecoder::new(self.compressed_bytes.as_slice());
        let mut plain_bytes = Vec::new();

        gzip_decoder
            .read_to_end(&mut plain_bytes)
            .map_err(|fault| PayloadCodecError::CorruptedStream(fault.to_string()))?;

        Ok(plain_bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.compressed_bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.compressed_bytes
    }

    #[must_use]
    pub fn compressed_len(&self) -> usize {
        self.compressed_bytes.len()
    }
}
