//! Shared types and wire constants.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Endpoint serving the publisher's RSA public key (PEM).
pub const EXPO_PUBLIC_KEY_URL: &str = "https://exp.host/--/manifest-public-key";

/// Response header carrying the signature dictionary.
pub const EXPO_SIGNATURE_HEADER: &str = "expo-signature";

/// Request header advertising which signatures the client can verify.
pub const EXPO_EXPECT_SIGNATURE_HEADER: &str = "expo-expect-signature";

/// Extended Key Usage purpose required of the embedded certificate.
pub const CODE_SIGNING_OID: &str = "1.3.6.1.5.5.7.3.3";

/// Metadata key selecting the signing algorithm.
pub const CODE_SIGNING_METADATA_ALGORITHM_KEY: &str = "alg";

/// Metadata key selecting the key id.
pub const CODE_SIGNING_METADATA_KEY_ID_KEY: &str = "keyid";

/// Key id used when the metadata does not name one.
pub const CODE_SIGNING_METADATA_DEFAULT_KEY_ID: &str = "root";

/// Signing algorithms the client can verify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeSigningAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    #[default]
    #[serde(rename = "rsa-v1_5-sha256")]
    RsaSha256,
}

impl CodeSigningAlgorithm {
    /// Wire name used in metadata and signature headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RsaSha256 => "rsa-v1_5-sha256",
        }
    }

    /// Exact wire-name lookup.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "rsa-v1_5-sha256" => Some(Self::RsaSha256),
            _ => None,
        }
    }

    /// Resolve the algorithm named in configuration metadata.
    ///
    /// Absent and unrecognized values both resolve to [`Self::RsaSha256`].
    pub fn from_metadata(value: Option<&str>) -> Self {
        match value {
            None => Self::RsaSha256,
            Some(name) => Self::from_wire(name).unwrap_or_else(|| {
                tracing::warn!(
                    alg = name,
                    default = Self::RsaSha256.as_str(),
                    "unrecognized code signing algorithm, using default"
                );
                Self::RsaSha256
            }),
        }
    }
}

impl fmt::Display for CodeSigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded content of a received `expo-signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSigningInfo {
    /// Base64 signature over the response body.
    pub signature: String,

    /// Key that produced the signature; `None` means the configuration default.
    pub key_id: Option<String>,
}

/// How a key request may use the transport's cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Serve from cache when an entry exists, without a network round trip.
    PreferCache,

    /// Always go to the network and refresh the cache.
    ForceNetwork,
}

/// Request descriptor handed to a [`crate::transport::KeyTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequest {
    pub url: String,
    pub cache_policy: CachePolicy,
}

impl KeyRequest {
    pub fn new(url: impl Into<String>, cache_policy: CachePolicy) -> Self {
        Self {
            url: url.into(),
            cache_policy,
        }
    }
}
