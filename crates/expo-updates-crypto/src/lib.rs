//! Update authenticity verification for an over-the-air update client.
//!
//! Two mechanisms prove that a downloaded manifest or bundle came from a
//! trusted publisher before it is applied:
//!
//! - **Remote key** (legacy): fetch the publisher's RSA public key from
//!   [`EXPO_PUBLIC_KEY_URL`], verify an RSA-SHA256 signature over the
//!   payload, and refetch the key from the network once if the cached copy
//!   is unusable
//! - **Code signing**: validate a certificate embedded in the client build,
//!   advertise the accepted scheme in the `expo-expect-signature` header,
//!   decode the `expo-signature` response header, and verify the body
//!   against the certificate's key
//!
//! # Code signing
//!
//! ```no_run
//! use expo_updates_crypto::{
//!     create_accept_signature_header, verify_code_signing, CodeSigningConfiguration,
//!     CodeSigningInfo,
//! };
//!
//! # fn example(certificate_pem: &str, headers: &reqwest::header::HeaderMap, body: &[u8])
//! #     -> Result<(), expo_updates_crypto::CryptoError> {
//! let configuration = CodeSigningConfiguration::new(certificate_pem, None);
//! let accept = create_accept_signature_header(&configuration)?;
//! // ... send `accept` as expo-expect-signature, receive headers + body ...
//! let info = CodeSigningInfo::from_headers(headers)?;
//! if !verify_code_signing(&configuration, &info, body)? {
//!     // do not trust the update
//! }
//! # let _ = accept;
//! # Ok(())
//! # }
//! ```
//!
//! # Remote key
//!
//! ```no_run
//! use expo_updates_crypto::{HttpKeyTransport, RemoteKeyVerification, RsaSignatureOutcome};
//!
//! # async fn example(manifest: &str, signature: &str) -> Result<(), expo_updates_crypto::CryptoError> {
//! let transport = HttpKeyTransport::from_env()?;
//! match RemoteKeyVerification::new(&transport, manifest, signature).run().await {
//!     RsaSignatureOutcome::Completed { is_valid } => println!("valid: {}", is_valid),
//!     RsaSignatureOutcome::Error { error, is_network_error } => {
//!         eprintln!("verification failed (network: {}): {}", is_network_error, error)
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `EXPO_UPDATES_KEY_TIMEOUT` | Key request timeout in seconds (default: 30) |
//! | `EXPO_UPDATES_KEY_CACHE_DIR` | Directory for cached key responses |
//! | `EXPO_UPDATES_KEY_CACHE` | `0`/`false` keeps cached keys in memory only |

pub mod cache;
pub mod code_signing;
pub mod config;
mod digest;
pub mod error;
pub mod header;
pub mod pem;
pub mod remote_key;
pub mod signature;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use cache::{CachedKey, KeyCache};
pub use code_signing::{
    validate_certificate_at, verify_code_signing, CodeSigningConfiguration, EmbeddedCertificate,
};
pub use config::TransportConfig;
pub use error::{CryptoError, CryptoResult};
pub use header::{create_accept_signature_header, parse_signature_header};
pub use pem::parse_public_key;
pub use remote_key::{
    spawn_verify_expo_public_rsa_signature, verify_expo_public_rsa_signature,
    verify_public_rsa_signature, RemoteKeyVerification, RsaSignatureListener,
    RsaSignatureOutcome, MAX_KEY_FETCH_ATTEMPTS,
};
pub use signature::{verify_signature, PublicKey};
pub use transport::{HttpKeyTransport, KeyTransport};
pub use types::{
    CachePolicy, CodeSigningAlgorithm, CodeSigningInfo, KeyRequest, CODE_SIGNING_OID,
    EXPO_EXPECT_SIGNATURE_HEADER, EXPO_PUBLIC_KEY_URL, EXPO_SIGNATURE_HEADER,
};
