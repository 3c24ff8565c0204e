use sha2::{Digest, Sha256};

/// `sha256:<hex>` digest of in-memory bytes.
pub(crate) fn sha256_hex_bytes(bytes: &[u8]) -> String {
    format!("sha256:{}", sha256_hex(bytes))
}

/// Bare lowercase hex SHA-256, for file names.
pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
