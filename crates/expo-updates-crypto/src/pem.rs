//! Public key text parsing for the remote-key flow.
//!
//! The key endpoint serves PEM text that is not guaranteed to end with a
//! newline after its footer, so this is a textual strip rather than a full
//! PEM armor parser: every line containing `PUBLIC KEY-----` is dropped, the
//! remainder is joined with all whitespace removed and decoded as Base64
//! SubjectPublicKeyInfo DER.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{CryptoError, CryptoResult};
use crate::signature::PublicKey;

const PEM_BOUNDARY_MARKER: &str = "PUBLIC KEY-----";

/// Parse a PEM-formatted RSA public key.
pub fn parse_public_key(pem: &str) -> CryptoResult<PublicKey> {
    let body = strip_boundaries(pem);

    let der = BASE64
        .decode(body.as_bytes())
        .map_err(|e| CryptoError::key_format(format!("invalid base64 public key: {}", e)))?;

    PublicKey::from_spki_der(&der)
}

// Whitespace anywhere in the body is skipped, including CR from CRLF input.
fn strip_boundaries(pem: &str) -> String {
    pem.lines()
        .filter(|line| !line.contains(PEM_BOUNDARY_MARKER))
        .flat_map(str::chars)
        .filter(|c| !c.is_ascii_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;

    #[test]
    fn test_parse_public_key() {
        let key = parse_public_key(&fixture("signer.pub.pem")).unwrap();
        assert_eq!(key.size(), 256);
    }

    #[test]
    fn test_crlf_and_missing_trailing_newline() {
        let pem = fixture("signer.pub.pem");
        let crlf = pem.trim_end().replace('\n', "\r\n");

        let expected = parse_public_key(&pem).unwrap();
        assert_eq!(parse_public_key(&crlf).unwrap(), expected);
    }

    #[test]
    fn test_whitespace_inside_lines_is_skipped() {
        let pem = fixture("signer.pub.pem");
        let spaced: String = pem
            .lines()
            .map(|line| {
                if line.contains(PEM_BOUNDARY_MARKER) {
                    line.to_string()
                } else {
                    let (head, tail) = line.split_at(line.len() / 2);
                    format!("  {} \t{}  ", head, tail)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        assert_eq!(
            parse_public_key(&spaced).unwrap(),
            parse_public_key(&pem).unwrap()
        );
    }

    #[test]
    fn test_bare_base64_without_boundaries() {
        let pem = fixture("signer.pub.pem");
        let bare = strip_boundaries(&pem);
        assert!(!bare.contains("-----"));

        assert_eq!(
            parse_public_key(&bare).unwrap(),
            parse_public_key(&pem).unwrap()
        );
    }

    #[test]
    fn test_strip_only_removes_public_key_markers() {
        let text = "-----BEGIN PUBLIC KEY-----\nAAAA\nBBBB\n-----END PUBLIC KEY-----";
        assert_eq!(strip_boundaries(text), "AAAABBBB");

        // Other armor labels are not markers and survive the strip.
        let text = "-----BEGIN CERTIFICATE-----\nAAAA";
        assert_eq!(strip_boundaries(text), "-----BEGIN CERTIFICATE-----AAAA");
    }

    #[test]
    fn test_invalid_base64_is_key_format_error() {
        let pem = "-----BEGIN PUBLIC KEY-----\n%%%%\n-----END PUBLIC KEY-----\n";
        let result = parse_public_key(pem);
        assert!(matches!(result, Err(CryptoError::KeyFormat { .. })));
    }

    #[test]
    fn test_non_spki_bytes_are_key_format_error() {
        let pem = format!(
            "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----\n",
            BASE64.encode(b"definitely not DER")
        );
        let result = parse_public_key(&pem);
        assert!(matches!(result, Err(CryptoError::KeyFormat { .. })));
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(parse_public_key("").is_err());
    }
}
