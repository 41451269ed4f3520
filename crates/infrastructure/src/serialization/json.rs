use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Failure to encode or decode stored session data.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// Value could not be encoded.
    #[error("failed to encode session data: {0}")]
    Encode(#[source] serde_json::Error),

    /// Input is not valid JSON or does not match the expected shape.
    #[error("failed to decode session data: {0}")]
    Decode(#[source] serde_json::Error),

    /// Encoder produced invalid UTF-8.
    #[error("encoded session data is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encodes `value` as indented JSON followed by a newline.
///
/// # Errors
///
/// Returns [`SerializationError::Encode`] if `value` cannot be represented as JSON.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value
        .serialize(&mut serializer)
        .map_err(SerializationError::Encode)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Same as [`to_json_stable`], as bytes ready to write.
///
/// # Errors
///
/// Returns [`SerializationError::Encode`] if `value` cannot be represented as JSON.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    to_json_stable(value).map(String::into_bytes)
}

/// Decodes a value from JSON bytes.
///
/// # Errors
///
/// Returns [`SerializationError::Decode`] on malformed or mismatched input.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Decode)
}
