//! Error types for update verification.

/// Verification errors.
///
/// Every variant carries owned strings only so that a memoized failure
/// (see [`crate::code_signing::CodeSigningConfiguration`]) can be cloned out
/// unchanged on every access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// Network or connectivity failure while fetching key material.
    #[error("network error: {message}")]
    Transport { message: String },

    /// Key endpoint answered, but not with a success status.
    #[error("unexpected HTTP {status} fetching {url}")]
    KeyResponse { status: u16, url: String },

    /// Public key text could not be decoded into an RSA key.
    #[error("invalid public key: {reason}")]
    KeyFormat { reason: String },

    /// Signature material is malformed or incompatible with the key.
    #[error("crypto error: {reason}")]
    Crypto { reason: String },

    /// Embedded certificate could not be parsed.
    #[error("invalid certificate: {reason}")]
    CertificateParse { reason: String },

    /// Embedded certificate is outside its validity window.
    #[error("certificate not valid now: valid from {not_before} until {not_after}")]
    CertificateExpired {
        not_before: String,
        not_after: String,
    },

    /// Embedded certificate is not eligible for code signing.
    #[error("X509v3 {extension}: {reason}")]
    CertificateUsage { extension: String, reason: String },

    /// No signature header on the response.
    #[error("no {header} header specified")]
    HeaderMissing { header: String },

    /// Signature header present but unusable.
    #[error("malformed signature header: {reason}")]
    HeaderFormat { reason: String },

    /// Signature was produced for a key the configuration does not hold.
    #[error("key id mismatch: expected {expected}, got {actual}")]
    KeyIdMismatch { expected: String, actual: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Key cache error.
    #[error("cache error: {message}")]
    Cache { message: String },
}

impl CryptoError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 1,

            // Certificate problems cannot be fixed by retrying
            Self::CertificateParse { .. } => 3,
            Self::CertificateExpired { .. } => 3,
            Self::CertificateUsage { .. } => 3,

            // Signature material
            Self::KeyFormat { .. } => 4,
            Self::Crypto { .. } => 4,
            Self::HeaderMissing { .. } => 4,
            Self::HeaderFormat { .. } => 4,
            Self::KeyIdMismatch { .. } => 4,

            Self::Transport { .. } => 5,
            Self::KeyResponse { .. } => 5,

            Self::Cache { .. } => 6,
        }
    }

    /// Whether the key endpoint could not be reached at all.
    ///
    /// A response that arrived with an error status is not a network error.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether a fresh copy of the key could change the outcome.
    ///
    /// This is the one class the remote-key flow recovers from by refetching
    /// the key over the network.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::KeyResponse { .. } | Self::KeyFormat { .. } | Self::Crypto { .. }
        )
    }

    pub(crate) fn key_format(reason: impl Into<String>) -> Self {
        Self::KeyFormat {
            reason: reason.into(),
        }
    }

    pub(crate) fn crypto(reason: impl Into<String>) -> Self {
        Self::Crypto {
            reason: reason.into(),
        }
    }

    pub(crate) fn certificate_parse(reason: impl Into<String>) -> Self {
        Self::CertificateParse {
            reason: reason.into(),
        }
    }

    pub(crate) fn certificate_usage(extension: &str, reason: &str) -> Self {
        Self::CertificateUsage {
            extension: extension.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn header_format(reason: impl Into<String>) -> Self {
        Self::HeaderFormat {
            reason: reason.into(),
        }
    }

    pub(crate) fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for CryptoError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// Result type for verification operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
