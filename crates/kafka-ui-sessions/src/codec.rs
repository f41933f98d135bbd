//! Record value decoding
//!
//! The REST proxy hands back record values in the wire encoding the consumer
//! was created with. Only `binary` needs client-side work (base64); the proxy
//! decodes `json` and `avro` itself, and formats this crate does not know are
//! passed through untouched.

use crate::error::{ConsumerError, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire format a consumer session is created with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum MessageFormat {
    /// Base64-encoded raw bytes
    #[default]
    Binary,
    /// JSON values, decoded by the proxy
    Json,
    /// Avro values, decoded by the proxy against the schema registry
    Avro,
    /// A format this client has no decoder for
    Other(String),
}

impl MessageFormat {
    /// Name used by the proxy for this format
    pub fn as_str(&self) -> &str {
        match self {
            MessageFormat::Binary => "binary",
            MessageFormat::Json => "json",
            MessageFormat::Avro => "avro",
            MessageFormat::Other(name) => name,
        }
    }

    /// Decode a record value encoded in this format
    pub fn decode(&self, value: Option<&str>) -> Result<Option<String>> {
        decode(value, self)
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MessageFormat {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "binary" => MessageFormat::Binary,
            "json" => MessageFormat::Json,
            "avro" => MessageFormat::Avro,
            _ => MessageFormat::Other(s.to_string()),
        }
    }
}

impl FromStr for MessageFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(MessageFormat::from(s))
    }
}

impl Serialize for MessageFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageFormat {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(MessageFormat::from(name.as_str()))
    }
}

/// Decode `value` according to `format`.
///
/// `None` is returned unchanged. Formats without a client-side decoder pass
/// the value through as-is.
pub fn decode(value: Option<&str>, format: &MessageFormat) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    match format {
        MessageFormat::Binary => decode_binary(value).map(Some),
        MessageFormat::Json | MessageFormat::Avro | MessageFormat::Other(_) => {
            Ok(Some(value.to_string()))
        }
    }
}

/// Standard alphabet, padding optional, non-zero trailing bits ignored
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

fn decode_binary(value: &str) -> Result<String> {
    // Line-wrapped payloads are accepted, as browsers' atob does
    let compact: String = value.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = LENIENT
        .decode(compact)
        .map_err(|e| ConsumerError::DecodeFailure {
            format: MessageFormat::Binary.to_string(),
            reason: e.to_string(),
        })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        // One char per byte keeps non-UTF-8 payloads lossless
        Err(e) => Ok(e.into_bytes().into_iter().map(char::from).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_binary() {
        let decoded = decode(Some("aGVsbG8="), &MessageFormat::Binary).unwrap();
        assert_eq!(decoded.as_deref(), Some("hello"));
    }

    #[test]
    fn test_decode_none_is_noop() {
        assert_eq!(decode(None, &MessageFormat::Binary).unwrap(), None);
        assert_eq!(decode(None, &MessageFormat::Other("xml".into())).unwrap(), None);
    }

    #[test]
    fn test_decode_non_utf8_keeps_bytes() {
        // 0xff 0x00 0x41
        let decoded = decode(Some("/wBB"), &MessageFormat::Binary).unwrap().unwrap();
        let chars: Vec<u32> = decoded.chars().map(|c| c as u32).collect();
        assert_eq!(chars, vec![0xff, 0x00, 0x41]);
    }

    #[test]
    fn test_decode_unpadded_and_wrapped() {
        let decoded = decode(Some("YQ"), &MessageFormat::Binary).unwrap();
        assert_eq!(decoded.as_deref(), Some("a"));

        let decoded = decode(Some("aGVs\nbG8=\r\n"), &MessageFormat::Binary).unwrap();
        assert_eq!(decoded.as_deref(), Some("hello"));

        let decoded = decode(Some("aGVsbG8"), &MessageFormat::Binary).unwrap();
        assert_eq!(decoded.as_deref(), Some("hello"));
    }

    #[test]
    fn test_decode_malformed_base64() {
        let err = decode(Some("not base64!"), &MessageFormat::Binary).unwrap_err();
        assert!(matches!(err, ConsumerError::DecodeFailure { ref format, .. } if format == "binary"));
    }

    #[test]
    fn test_unknown_format_passes_through() {
        let format = MessageFormat::from("protobuf");
        assert_eq!(format, MessageFormat::Other("protobuf".into()));
        assert_eq!(format.decode(Some("aGVsbG8=")).unwrap().as_deref(), Some("aGVsbG8="));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(MessageFormat::from("BINARY"), MessageFormat::Binary);
        assert_eq!(MessageFormat::from("avro").as_str(), "avro");
        assert_eq!(serde_json::to_string(&MessageFormat::Json).unwrap(), "\"json\"");
        let parsed: MessageFormat = serde_json::from_str("\"binary\"").unwrap();
        assert_eq!(parsed, MessageFormat::Binary);
    }
}
