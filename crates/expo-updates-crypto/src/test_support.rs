//! Fixture helpers shared by unit tests.

use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::Sha256;

pub(crate) fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub(crate) fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

pub(crate) fn signer_private_key() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(&fixture("signer.key")).unwrap()
}

/// Sign with the key behind `signer.pub.pem` and every test certificate.
pub(crate) fn sign_b64(message: &[u8]) -> String {
    let signing_key = SigningKey::<Sha256>::new(signer_private_key());
    BASE64.encode(signing_key.sign(message).to_bytes())
}
