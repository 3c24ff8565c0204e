//! Legacy verification against the publisher key served at
//! [`EXPO_PUBLIC_KEY_URL`].
//!
//! # Attempts
//!
//! ```text
//! Cached ──fetch(PreferCache)──> verify ──ok──> Completed(is_valid)
//!   │                              │
//!   └─transport error─> Error(network)  └─status/key/crypto error─> Network
//! Network ──fetch(ForceNetwork)─> verify ──ok──> Completed(is_valid)
//!   │                              │
//!   └─transport error─> Error(network)  └─status/key/crypto error─> Error(not network)
//! ```
//!
//! A clean `false` is final. A received response that yields no usable key,
//! whether an error status or a malformed or incompatible key, triggers the
//! second attempt. Only a connectivity failure ends the flow at once. At most two fetches happen and exactly one outcome is
//! reported.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{CryptoError, CryptoResult};
use crate::pem::parse_public_key;
use crate::signature::verify_signature;
use crate::transport::KeyTransport;
use crate::types::{CachePolicy, CodeSigningAlgorithm, KeyRequest, EXPO_PUBLIC_KEY_URL};

/// Upper bound on key fetches per verification.
pub const MAX_KEY_FETCH_ATTEMPTS: usize = 2;

/// Receives the single terminal outcome of a verification.
///
/// Both methods consume the listener, so at most one can ever run.
pub trait RsaSignatureListener: Send {
    fn on_completed(self, is_valid: bool);

    fn on_error(self, error: CryptoError, is_network_error: bool);
}

/// Terminal outcome of a remote-key verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsaSignatureOutcome {
    /// Verification ran to completion.
    Completed { is_valid: bool },

    /// Verification could not complete.
    Error {
        error: CryptoError,
        is_network_error: bool,
    },
}

impl RsaSignatureOutcome {
    /// Deliver this outcome to `listener`.
    pub fn notify<L: RsaSignatureListener>(self, listener: L) {
        match self {
            Self::Completed { is_valid } => listener.on_completed(is_valid),
            Self::Error {
                error,
                is_network_error,
            } => listener.on_error(error, is_network_error),
        }
    }
}

impl RsaSignatureListener for oneshot::Sender<RsaSignatureOutcome> {
    fn on_completed(self, is_valid: bool) {
        let _ = self.send(RsaSignatureOutcome::Completed { is_valid });
    }

    fn on_error(self, error: CryptoError, is_network_error: bool) {
        let _ = self.send(RsaSignatureOutcome::Error {
            error,
            is_network_error,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Cached,
    Network,
}

impl Attempt {
    fn cache_policy(self) -> CachePolicy {
        match self {
            Self::Cached => CachePolicy::PreferCache,
            Self::Network => CachePolicy::ForceNetwork,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::Cached => Some(Self::Network),
            Self::Network => None,
        }
    }
}

/// One verification request: payload, signature and the transport to use.
#[derive(Debug)]
pub struct RemoteKeyVerification<'a, T: ?Sized> {
    transport: &'a T,
    plain_text: &'a str,
    signature: &'a str,
}

impl<'a, T: KeyTransport + ?Sized> RemoteKeyVerification<'a, T> {
    pub fn new(transport: &'a T, plain_text: &'a str, signature: &'a str) -> Self {
        Self {
            transport,
            plain_text,
            signature,
        }
    }

    /// Drive the attempts to a terminal outcome.
    pub async fn run(&self) -> RsaSignatureOutcome {
        let mut attempt = Attempt::Cached;

        loop {
            let request = KeyRequest::new(EXPO_PUBLIC_KEY_URL, attempt.cache_policy());

            let result = match self.transport.fetch(&request).await {
                Ok(public_key_pem) => {
                    verify_public_rsa_signature(&public_key_pem, self.plain_text, self.signature)
                }
                Err(error) if error.is_network() => {
                    warn!(error = %error, attempt = ?attempt, "failed to fetch public key");
                    return RsaSignatureOutcome::Error {
                        error,
                        is_network_error: true,
                    };
                }
                Err(error) => Err(error),
            };

            match result {
                Ok(is_valid) => {
                    debug!(is_valid, attempt = ?attempt, "remote key verification completed");
                    return RsaSignatureOutcome::Completed { is_valid };
                }
                Err(error) => match attempt.next() {
                    Some(next) => {
                        warn!(
                            error = %error,
                            "verification with cached public key failed, refetching from network"
                        );
                        attempt = next;
                    }
                    None => {
                        return RsaSignatureOutcome::Error {
                            error,
                            is_network_error: false,
                        };
                    }
                },
            }
        }
    }
}

/// Parse `public_key_pem` and verify an RSA-SHA256 signature over `plain_text`.
pub fn verify_public_rsa_signature(
    public_key_pem: &str,
    plain_text: &str,
    signature_b64: &str,
) -> CryptoResult<bool> {
    let public_key = parse_public_key(public_key_pem)?;
    verify_signature(
        &public_key,
        CodeSigningAlgorithm::RsaSha256,
        plain_text.as_bytes(),
        signature_b64,
    )
}

/// Verify `data` against the publisher key and report to `listener`.
pub async fn verify_expo_public_rsa_signature<T, L>(
    transport: &T,
    data: &str,
    signature: &str,
    listener: L,
) where
    T: KeyTransport + ?Sized,
    L: RsaSignatureListener,
{
    RemoteKeyVerification::new(transport, data, signature)
        .run()
        .await
        .notify(listener);
}

/// Like [`verify_expo_public_rsa_signature`], on a background task.
///
/// There is no cancellation: aborting the handle or dropping the result is
/// the caller's only option.
pub fn spawn_verify_expo_public_rsa_signature<T, L>(
    transport: Arc<T>,
    data: String,
    signature: String,
    listener: L,
) -> JoinHandle<()>
where
    T: KeyTransport + ?Sized + 'static,
    L: RsaSignatureListener + 'static,
{
    tokio::spawn(async move {
        verify_expo_public_rsa_signature(transport.as_ref(), &data, &signature, listener).await;
    })
}
