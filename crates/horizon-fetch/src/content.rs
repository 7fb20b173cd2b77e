//! Typed decoding of loaded content.
//!
//! Every transport delivers text. The loader converts it into its declared
//! content type through [`Content::decode`] at the moment the data arrives;
//! a failure becomes a `Fail` event classified as
//! [`FailureKind::Decode`](crate::FailureKind::Decode) instead of a
//! completion.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A type a loader can produce from received text.
pub trait Content: Clone + Send + 'static {
    /// Decode the raw text delivered by the transport.
    fn decode(raw: String) -> Result<Self>;
}

impl Content for String {
    fn decode(raw: String) -> Result<Self> {
        Ok(raw)
    }
}

impl Content for Bytes {
    fn decode(raw: String) -> Result<Self> {
        Ok(Bytes::from(raw))
    }
}

impl Content for serde_json::Value {
    fn decode(raw: String) -> Result<Self> {
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Content deserialized from JSON into `T`.
///
/// ```
/// use horizon_fetch::{Content, Json};
///
/// #[derive(Clone, serde::Deserialize)]
/// struct Health {
///     ok: bool,
/// }
///
/// let Json(health) = Json::<Health>::decode(r#"{"ok":true}"#.to_string()).unwrap();
/// assert!(health.ok);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Content for Json<T>
where
    T: DeserializeOwned + Clone + Send + 'static,
{
    fn decode(raw: String) -> Result<Self> {
        Ok(Json(serde_json::from_str(&raw)?))
    }
}

/// Content deserialized from XML into `T`.
#[derive(Clone, Debug, PartialEq)]
pub struct Xml<T>(pub T);

impl<T> Content for Xml<T>
where
    T: DeserializeOwned + Clone + Send + 'static,
{
    fn decode(raw: String) -> Result<Self> {
        Ok(Xml(quick_xml::de::from_str(&raw)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Deserialize)]
    struct Book {
        title: String,
        pages: u32,
    }

    #[test]
    fn test_string_is_passthrough() {
        assert_eq!(String::decode("  raw\n".into()).unwrap(), "  raw\n");
    }

    #[test]
    fn test_bytes_keep_exact_contents() {
        let bytes = Bytes::decode("abc".into()).unwrap();
        assert_eq!(&bytes[..], b"abc");
    }

    #[test]
    fn test_json_value() {
        let value = serde_json::Value::decode(r#"{"ok":true}"#.into()).unwrap();
        assert_eq!(value, serde_json::json!({"ok": true}));
    }

    #[test]
    fn test_typed_json() {
        let Json(book) = Json::<Book>::decode(r#"{"title":"Rust","pages":300}"#.into()).unwrap();
        assert_eq!(book.title, "Rust");
        assert_eq!(book.pages, 300);
    }

    #[test]
    fn test_typed_xml() {
        let xml = "<book><title>Rust</title><pages>300</pages></book>";
        let Xml(book) = Xml::<Book>::decode(xml.into()).unwrap();
        assert_eq!(
            book,
            Book {
                title: "Rust".into(),
                pages: 300
            }
        );
    }

    #[test]
    fn test_malformed_json_is_decode_failure() {
        let err = serde_json::Value::decode("{not json".into()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
    }
}
