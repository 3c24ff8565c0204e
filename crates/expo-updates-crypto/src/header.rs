//! Signature header codec (RFC 8941 structured field dictionaries).
//!
//! Two directions, two shapes:
//!
//! - outgoing `expo-expect-signature`: `sig` is the boolean `true`,
//!   advertising that the client verifies signatures with `keyid`/`alg`
//! - incoming `expo-signature`: `sig` is a string carrying the Base64
//!   signature, `keyid` optionally names the key
//!
//! ```text
//! expo-expect-signature: sig, keyid="root", alg="rsa-v1_5-sha256"
//! expo-signature: sig="MEUCIQ...", keyid="root"
//! ```

use reqwest::header::HeaderMap;
use sfv::{BareItem, Dictionary, Item, ListEntry, Parser, SerializeValue};

use crate::code_signing::CodeSigningConfiguration;
use crate::error::{CryptoError, CryptoResult};
use crate::types::{CodeSigningInfo, EXPO_SIGNATURE_HEADER};

const STRUCTURED_FIELD_KEY_SIGNATURE: &str = "sig";
const STRUCTURED_FIELD_KEY_KEY_ID: &str = "keyid";
const STRUCTURED_FIELD_KEY_ALGORITHM: &str = "alg";

/// Build the `expo-expect-signature` value for a configuration.
pub fn create_accept_signature_header(
    configuration: &CodeSigningConfiguration,
) -> CryptoResult<String> {
    let mut dictionary = Dictionary::new();
    dictionary.insert(
        STRUCTURED_FIELD_KEY_SIGNATURE.to_string(),
        Item::new(BareItem::Boolean(true)).into(),
    );
    dictionary.insert(
        STRUCTURED_FIELD_KEY_KEY_ID.to_string(),
        Item::new(BareItem::String(configuration.key_id().to_string())).into(),
    );
    dictionary.insert(
        STRUCTURED_FIELD_KEY_ALGORITHM.to_string(),
        Item::new(BareItem::String(configuration.algorithm().as_str().to_string())).into(),
    );

    dictionary
        .serialize_value()
        .map_err(|e| CryptoError::header_format(format!("cannot serialize header: {}", e)))
}

/// Decode an `expo-signature` value.
pub fn parse_signature_header(signature_field: Option<&str>) -> CryptoResult<CodeSigningInfo> {
    let signature_field = signature_field.ok_or_else(|| CryptoError::HeaderMissing {
        header: EXPO_SIGNATURE_HEADER.to_string(),
    })?;

    let dictionary = Parser::parse_dictionary(signature_field.as_bytes()).map_err(|e| {
        CryptoError::header_format(format!("invalid structured field dictionary: {}", e))
    })?;

    let signature = string_member(&dictionary, STRUCTURED_FIELD_KEY_SIGNATURE).ok_or_else(|| {
        CryptoError::header_format(format!(
            "structured field {} not found in {} header",
            STRUCTURED_FIELD_KEY_SIGNATURE, EXPO_SIGNATURE_HEADER
        ))
    })?;
    let key_id = string_member(&dictionary, STRUCTURED_FIELD_KEY_KEY_ID);

    Ok(CodeSigningInfo { signature, key_id })
}

fn string_member(dictionary: &Dictionary, key: &str) -> Option<String> {
    match dictionary.get(key) {
        Some(ListEntry::Item(Item {
            bare_item: BareItem::String(value),
            ..
        })) => Some(value.clone()),
        _ => None,
    }
}

impl CodeSigningInfo {
    /// Decode the `expo-signature` header of a response.
    pub fn from_headers(headers: &HeaderMap) -> CryptoResult<Self> {
        let value = match headers.get(EXPO_SIGNATURE_HEADER) {
            Some(value) => Some(value.to_str().map_err(|e| {
                CryptoError::header_format(format!("non-ASCII {} header: {}", EXPO_SIGNATURE_HEADER, e))
            })?),
            None => None,
        };
        parse_signature_header(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use reqwest::header::HeaderValue;

    use super::*;
    use crate::test_support::fixture;
    use crate::types::CodeSigningAlgorithm;

    fn configuration(key_id: Option<&str>) -> CodeSigningConfiguration {
        let metadata = key_id.map(|k| HashMap::from([("keyid".to_string(), k.to_string())]));
        CodeSigningConfiguration::new(fixture("code_signing_valid.pem"), metadata)
    }

    #[test]
    fn test_accept_header_defaults() {
        let header = create_accept_signature_header(&configuration(None)).unwrap();
        assert_eq!(header, r#"sig, keyid="root", alg="rsa-v1_5-sha256""#);
    }

    #[test]
    fn test_accept_header_custom_key_id() {
        let header = create_accept_signature_header(&configuration(Some("test"))).unwrap();
        assert_eq!(header, r#"sig, keyid="test", alg="rsa-v1_5-sha256""#);
    }

    #[test]
    fn test_accept_header_does_not_touch_certificate() {
        let configuration = CodeSigningConfiguration::new("not a certificate", None);
        assert!(create_accept_signature_header(&configuration).is_ok());
    }

    #[test]
    fn test_accept_header_roundtrip_key_id_and_alg() {
        let header = create_accept_signature_header(&configuration(Some("k-2024"))).unwrap();
        let dictionary = Parser::parse_dictionary(header.as_bytes()).unwrap();

        assert_eq!(
            string_member(&dictionary, "keyid").as_deref(),
            Some("k-2024")
        );
        let alg = string_member(&dictionary, "alg").unwrap();
        assert_eq!(
            CodeSigningAlgorithm::from_wire(&alg),
            Some(CodeSigningAlgorithm::RsaSha256)
        );

        // The advertisement's `sig` is a boolean, so it is not a decodable signature.
        let err = parse_signature_header(Some(&header)).unwrap_err();
        assert!(matches!(err, CryptoError::HeaderFormat { .. }));
    }

    #[test]
    fn test_parse_signature_header() {
        let info = parse_signature_header(Some(r#"sig="12345", keyid="test""#)).unwrap();
        assert_eq!(info.signature, "12345");
        assert_eq!(info.key_id.as_deref(), Some("test"));
    }

    #[test]
    fn test_parse_signature_header_without_key_id() {
        let info = parse_signature_header(Some(r#"sig="12345""#)).unwrap();
        assert_eq!(info.signature, "12345");
        assert!(info.key_id.is_none());
    }

    #[test]
    fn test_parse_signature_header_ignores_unknown_members() {
        let info =
            parse_signature_header(Some(r#"sig="abc", keyid="k", alg="rsa-v1_5-sha256", x=1"#))
                .unwrap();
        assert_eq!(info.signature, "abc");
        assert_eq!(info.key_id.as_deref(), Some("k"));
    }

    #[test]
    fn test_parse_signature_header_non_string_key_id_is_absent() {
        let info = parse_signature_header(Some(r#"sig="abc", keyid=7"#)).unwrap();
        assert!(info.key_id.is_none());
    }

    #[test]
    fn test_parse_signature_header_missing() {
        let err = parse_signature_header(None).unwrap_err();
        assert!(matches!(err, CryptoError::HeaderMissing { .. }));
        assert_eq!(err.to_string(), "no expo-signature header specified");
    }

    #[test]
    fn test_parse_signature_header_boolean_sig_rejected() {
        let err = parse_signature_header(Some(r#"sig=?1, keyid="abc", alg="rsa-v1_5-sha256""#))
            .unwrap_err();
        match err {
            CryptoError::HeaderFormat { reason } => assert!(reason.contains("sig")),
            other => panic!("expected HeaderFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_signature_header_missing_sig() {
        let err = parse_signature_header(Some(r#"keyid="abc""#)).unwrap_err();
        assert!(matches!(err, CryptoError::HeaderFormat { ref reason } if reason.contains("sig")));
    }

    #[test]
    fn test_parse_signature_header_malformed() {
        let err = parse_signature_header(Some("sig=\"unterminated")).unwrap_err();
        assert!(matches!(err, CryptoError::HeaderFormat { .. }));
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            EXPO_SIGNATURE_HEADER,
            HeaderValue::from_static(r#"sig="c2lnbmF0dXJl", keyid="root""#),
        );

        let info = CodeSigningInfo::from_headers(&headers).unwrap();
        assert_eq!(info.signature, "c2lnbmF0dXJl");
        assert_eq!(info.key_id.as_deref(), Some("root"));

        let empty = HeaderMap::new();
        assert!(matches!(
            CodeSigningInfo::from_headers(&empty),
            Err(CryptoError::HeaderMissing { .. })
        ));
    }
}
