//! RSA signature verification primitive.
//!
//! Both verification paths end here: the remote-key flow with a key parsed
//! from PEM, and code signing with the embedded certificate's key.
//!
//! Malformed input (bad Base64, a signature whose length does not match the
//! key) is an `Err`. A well-formed signature that simply does not match the
//! message is `Ok(false)`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::signature::Verifier;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use sha2::Sha256;

use crate::digest::sha256_hex_bytes;
use crate::error::{CryptoError, CryptoResult};
use crate::types::CodeSigningAlgorithm;

/// RSA public key usable for signature verification only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: RsaPublicKey,
}

impl PublicKey {
    /// Decode a DER-encoded X.509 SubjectPublicKeyInfo holding an RSA key.
    pub fn from_spki_der(der: &[u8]) -> CryptoResult<Self> {
        RsaPublicKey::from_public_key_der(der)
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::key_format(format!("invalid SPKI public key: {}", e)))
    }

    /// Modulus length in bytes; every valid signature has exactly this length.
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// `sha256:<hex>` over the SPKI encoding, for logs and diagnostics.
    pub fn fingerprint(&self) -> CryptoResult<String> {
        let der = self
            .inner
            .to_public_key_der()
            .map_err(|e| CryptoError::key_format(format!("failed to encode public key: {}", e)))?;
        Ok(sha256_hex_bytes(der.as_bytes()))
    }

    pub fn as_rsa(&self) -> &RsaPublicKey {
        &self.inner
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(inner: RsaPublicKey) -> Self {
        Self { inner }
    }
}

/// Verify a Base64 signature over `message`.
pub fn verify_signature(
    public_key: &PublicKey,
    algorithm: CodeSigningAlgorithm,
    message: &[u8],
    signature_b64: &str,
) -> CryptoResult<bool> {
    let signature_bytes = BASE64
        .decode(signature_b64.trim())
        .map_err(|e| CryptoError::crypto(format!("invalid base64 signature: {}", e)))?;

    match algorithm {
        CodeSigningAlgorithm::RsaSha256 => {
            verify_rsa_sha256(public_key.as_rsa(), message, &signature_bytes)
        }
    }
}

fn verify_rsa_sha256(key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> CryptoResult<bool> {
    if signature.len() != key.size() {
        return Err(CryptoError::crypto(format!(
            "signature length {} does not match key size {}",
            signature.len(),
            key.size()
        )));
    }

    let signature = Signature::try_from(signature)
        .map_err(|e| CryptoError::crypto(format!("invalid signature bytes: {}", e)))?;

    let verifying_key = VerifyingKey::<Sha256>::new(key.clone());
    Ok(verifying_key.verify(message, &signature).is_ok())
}
