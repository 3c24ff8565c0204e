//! Code signing against a certificate embedded in the client build.
//!
//! A [`CodeSigningConfiguration`] is cheap to construct and never fails.
//! The certificate is validated on first access to
//! [`CodeSigningConfiguration::embedded_certificate`]; the outcome, success or
//! the specific failure, is stored and handed back on every later access, from
//! any thread.
//!
//! # Validation
//!
//! 1. Parse the PEM text as a single X.509 certificate
//! 2. Current time within `[notBefore, notAfter]`
//! 3. Key Usage has Digital Signature
//! 4. Extended Key Usage has Code Signing (`1.3.6.1.5.5.7.3.3`)

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use x509_parser::pem::parse_x509_pem;

use crate::digest::sha256_hex_bytes;
use crate::error::{CryptoError, CryptoResult};
use crate::signature::{verify_signature, PublicKey};
use crate::types::{
    CodeSigningAlgorithm, CodeSigningInfo, CODE_SIGNING_METADATA_ALGORITHM_KEY,
    CODE_SIGNING_METADATA_DEFAULT_KEY_ID, CODE_SIGNING_METADATA_KEY_ID_KEY, CODE_SIGNING_OID,
};

/// A certificate that passed code-signing validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedCertificate {
    /// DER encoding of the certificate.
    pub der: Vec<u8>,

    /// Subject distinguished name.
    pub subject: String,

    /// Start of the validity window.
    pub not_before: DateTime<Utc>,

    /// End of the validity window.
    pub not_after: DateTime<Utc>,

    /// `sha256:<hex>` over the DER encoding.
    pub fingerprint: String,

    spki_der: Vec<u8>,
}

impl EmbeddedCertificate {
    /// The certificate's public key.
    pub fn public_key(&self) -> CryptoResult<PublicKey> {
        PublicKey::from_spki_der(&self.spki_der)
    }
}

/// Embedded certificate plus signing metadata for one update session.
#[derive(Debug, Clone)]
pub struct CodeSigningConfiguration {
    certificate_text: String,
    metadata: Option<HashMap<String, String>>,
    algorithm: CodeSigningAlgorithm,
    key_id: String,
    embedded_certificate: OnceLock<CryptoResult<EmbeddedCertificate>>,
}

impl CodeSigningConfiguration {
    pub fn new(
        certificate_text: impl Into<String>,
        metadata: Option<HashMap<String, String>>,
    ) -> Self {
        let algorithm = CodeSigningAlgorithm::from_metadata(
            metadata
                .as_ref()
                .and_then(|m| m.get(CODE_SIGNING_METADATA_ALGORITHM_KEY))
                .map(String::as_str),
        );

        let key_id = metadata
            .as_ref()
            .and_then(|m| m.get(CODE_SIGNING_METADATA_KEY_ID_KEY))
            .cloned()
            .unwrap_or_else(|| CODE_SIGNING_METADATA_DEFAULT_KEY_ID.to_string());

        Self {
            certificate_text: certificate_text.into(),
            metadata,
            algorithm,
            key_id,
            embedded_certificate: OnceLock::new(),
        }
    }

    /// Build from a JSON metadata object such as `{"alg": "...", "keyid": "..."}`.
    pub fn from_metadata_json(
        certificate_text: impl Into<String>,
        metadata_json: &str,
    ) -> CryptoResult<Self> {
        let metadata: HashMap<String, String> =
            serde_json::from_str(metadata_json).map_err(|e| CryptoError::Config {
                message: format!("invalid code signing metadata: {}", e),
            })?;

        Ok(Self::new(certificate_text, Some(metadata)))
    }

    /// The validated certificate, validating on first access.
    pub fn embedded_certificate(&self) -> CryptoResult<&EmbeddedCertificate> {
        self.embedded_certificate
            .get_or_init(|| validate_certificate_at(&self.certificate_text, Utc::now()))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn algorithm(&self) -> CodeSigningAlgorithm {
        self.algorithm
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn certificate_text(&self) -> &str {
        &self.certificate_text
    }

    pub fn metadata(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }
}

/// Validate PEM certificate text for code signing as of `now`.
pub fn validate_certificate_at(
    certificate_text: &str,
    now: DateTime<Utc>,
) -> CryptoResult<EmbeddedCertificate> {
    let (_, pem) = parse_x509_pem(certificate_text.as_bytes())
        .map_err(|e| CryptoError::certificate_parse(format!("invalid PEM: {}", e)))?;

    if pem.label != "CERTIFICATE" {
        return Err(CryptoError::certificate_parse(format!(
            "expected CERTIFICATE block, found {}",
            pem.label
        )));
    }

    let certificate = pem
        .parse_x509()
        .map_err(|e| CryptoError::certificate_parse(format!("invalid X.509 DER: {}", e)))?;

    let validity = certificate.validity();
    let not_before = to_datetime(validity.not_before.timestamp())?;
    let not_after = to_datetime(validity.not_after.timestamp())?;
    if now < not_before || now > not_after {
        return Err(CryptoError::CertificateExpired {
            not_before: not_before.to_rfc3339(),
            not_after: not_after.to_rfc3339(),
        });
    }

    let key_usage = certificate
        .key_usage()
        .map_err(|e| CryptoError::certificate_parse(format!("invalid key usage: {}", e)))?;
    let digital_signature = key_usage
        .map(|ext| ext.value.digital_signature())
        .unwrap_or(false);
    if !digital_signature {
        return Err(CryptoError::certificate_usage(
            "Key Usage",
            "Digital Signature not present",
        ));
    }

    let extended_key_usage = certificate.extended_key_usage().map_err(|e| {
        CryptoError::certificate_parse(format!("invalid extended key usage: {}", e))
    })?;
    let code_signing = extended_key_usage
        .map(|ext| {
            ext.value.code_signing
                || ext
                    .value
                    .other
                    .iter()
                    .any(|oid| oid.to_id_string() == CODE_SIGNING_OID)
        })
        .unwrap_or(false);
    if !code_signing {
        return Err(CryptoError::certificate_usage(
            "Extended Key Usage",
            "Code Signing not present",
        ));
    }

    let embedded = EmbeddedCertificate {
        der: pem.contents.clone(),
        subject: certificate.subject().to_string(),
        not_before,
        not_after,
        fingerprint: sha256_hex_bytes(&pem.contents),
        spki_der: certificate.public_key().raw.to_vec(),
    };

    tracing::debug!(
        subject = %embedded.subject,
        fingerprint = %embedded.fingerprint,
        not_after = %embedded.not_after,
        "embedded certificate validated"
    );

    Ok(embedded)
}

fn to_datetime(timestamp: i64) -> CryptoResult<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| CryptoError::certificate_parse("validity timestamp out of range"))
}

/// Verify a code-signed response body.
///
/// The header's key id, when present, must name the configuration's key;
/// absent means the configuration default. A different key id is rejected
/// with [`CryptoError::KeyIdMismatch`] before any signature check, where
/// expo-updates clients verify against the embedded certificate whatever
/// key id the header names.
pub fn verify_code_signing(
    configuration: &CodeSigningConfiguration,
    info: &CodeSigningInfo,
    bytes: &[u8],
) -> CryptoResult<bool> {
    let certificate = configuration.embedded_certificate()?;

    if let Some(key_id) = &info.key_id {
        if key_id != configuration.key_id() {
            return Err(CryptoError::KeyIdMismatch {
                expected: configuration.key_id().to_string(),
                actual: key_id.clone(),
            });
        }
    }

    let public_key = certificate.public_key()?;
    verify_signature(&public_key, configuration.algorithm(), bytes, &info.signature)
}
