// [libs/core/token-vault-rs/src/lib.rs]
/*!
 * =================================================================
 * APARATO: HOOK TOKEN VAULT ENGINE (V5.2 - GCM SEALED)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: SELLADO Y APERTURA DE TOKENS DE WEBHOOK
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ZERO LEAKAGE: El token jamás se registra ni se devuelve; el
 *    catálogo de fallos no transporta material sensible.
 * 2. KEY CACHING: La derivación PBKDF2 ocurre una sola vez en la
 *    construcción; cada petición solo paga el AES-GCM.
 * 3. ROTATION BY REDEPLOY: Un secreto nuevo invalida todos los
 *    tokens anteriores; no existe multi-llave.
 *
 * # Mathematical Proof (Tamper Evidence):
 * AES-256-GCM autentica el texto cifrado con su tag de 128 bits.
 * Cualquier bit alterado en el transporte hace fallar la verificación
 * con probabilidad 1 - 2^-128, de modo que un token manipulado nunca
 * valida.
 * =================================================================
 */

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use graphline_domain_models::ProjectId;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenVaultError {
    /// El secreto maestro del entorno está vacío o malformado.
    #[error("[L1_VAULT_CONFIG_FAULT]: HOOK_TOKEN_SECRET_VOID")]
    SecretMaterialVoid,

    /// El token de transporte no es base64 íntegro.
    #[error("[L1_VAULT_FAULT]: TRANSPORT_ENCODING_REJECTED -> {0}")]
    EncodingError(#[from] base64::DecodeError),

    /// La ráfaga es demasiado corta para contener nonce + tag.
    #[error("[L1_VAULT_FAULT]: TOKEN_STRUCTURE_TRUNCATED")]
    TruncatedToken,

    /// Verificación de integridad fallida o llave incorrecta.
    #[error("[L1_VAULT_FAULT]: SEAL_VERIFICATION_FAILED")]
    SealVerificationFailed,

    /// El texto plano recuperado no es un claim válido.
    #[error("[L1_VAULT_FAULT]: CLAIMS_DESERIALIZATION_FAILED")]
    ClaimsCorrupted,
}

/// Contenido en claro de un token de webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookTokenClaims {
    /// Proyecto al que el token autoriza a notificar.
    pub project_id: ProjectId,
}

/// Token sellado listo para viajar en la cabecera `X-Gitlab-Token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedHookToken(String);

impl SealedHookToken {
    #[must_use]
    pub fn from_header_value(header_value: &str) -> Self {
        Self(header_value.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Motor simétrico de sellado de tokens con llave derivada del entorno.
pub struct HookTokenVault {
    derived_key_material: [u8; Self::KEY_LENGTH_BYTES],
}

impl HookTokenVault {
    /// Iteraciones de endurecimiento de la frase maestra.
    const PBKDF2_ITERATIONS: u32 = 150_000;
    const KEY_LENGTH_BYTES: usize = 32;
    const NONCE_LENGTH_BYTES: usize = 12;
    /// Sal determinista del dominio de tokens (separación de contextos).
    const DOMAIN_SALT: &'static [u8] = b"graphline_hook_token_v1";

    /**
     * Forja la bóveda derivando la llave AES desde el secreto del proceso.
     *
     * # Errors:
     * - `SecretMaterialVoid`: Si el secreto está vacío tras el trim.
     */
    pub fn from_secret(hook_token_secret: &str) -> Result<Self, TokenVaultError> {
        if hook_token_secret.trim().is_empty() {
            return Err(TokenVaultError::SecretMaterialVoid);
        }

        let mut derived_key_material = [0u8; Self::KEY_LENGTH_BYTES];
        pbkdf2_hmac::<Sha256>(
            hook_token_secret.as_bytes(),
            Self::DOMAIN_SALT,
            Self::PBKDF2_ITERATIONS,
            &mut derived_key_material,
        );

        Ok(Self { derived_key_material })
    }

    /**
     * Sella los claims en un token de transporte `base64(nonce || ct || tag)`.
     *
     * # Errors:
     * - `SealVerificationFailed`: Si el motor GCM colapsa (no debería con
     *   nonce fresco y llave válida).
     */
    pub fn seal(&self, claims: &HookTokenClaims) -> Result<SealedHookToken, TokenVaultError> {
        let serialized_claims =
            serde_json::to_vec(claims).map_err(|_| TokenVaultError::ClaimsCorrupted)?;

        let mut nonce_material = [0u8; Self::NONCE_LENGTH_BYTES];
        rand::thread_rng().fill_bytes(&mut nonce_material);

        let cipher_engine = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.derived_key_material));
        let sealed_bytes = cipher_engine
            .encrypt(Nonce::from_slice(&nonce_material), serialized_claims.as_ref())
            .map_err(|_| TokenVaultError::SealVerificationFailed)?;

        let mut transport_frame = Vec::with_capacity(Self::NONCE_LENGTH_BYTES + sealed_bytes.len());
        transport_frame.extend_from_slice(&nonce_material);
        transport_frame.extend_from_slice(&sealed_bytes);

        Ok(SealedHookToken(BASE64.encode(transport_frame)))
    }

    /**
     * Abre un token de transporte y recupera sus claims.
     *
     * # Errors:
     * - `EncodingError` / `TruncatedToken`: Estructura de transporte inválida.
     * - `SealVerificationFailed`: Tag GCM rechazado (manipulación o rotación).
     * - `ClaimsCorrupted`: Texto plano que no decodifica como claims.
     */
    pub fn unseal(&self, token: &SealedHookToken) -> Result<HookTokenClaims, TokenVaultError> {
        let transport_frame = BASE64.decode(token.as_str())?;

        if transport_frame.len() <= Self::NONCE_LENGTH_BYTES {
            return Err(TokenVaultError::TruncatedToken);
        }

        let (nonce_material, sealed_bytes) = transport_frame.split_at(Self::NONCE_LENGTH_BYTES);

        let cipher_engine = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.derived_key_material));
        let plain_bytes = cipher_engine
            .decrypt(Nonce::from_slice(nonce_material), sealed_bytes)
            .map_err(|_| TokenVaultError::SealVerificationFailed)?;

        serde_json::from_slice(&plain_bytes).map_err(|_| TokenVaultError::ClaimsCorrupted)
    }
}
