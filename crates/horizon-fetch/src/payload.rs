//! Outbound request bodies and content-type negotiation.
//!
//! The content type of a [`Payload`] follows from its shape:
//!
//! | Shape | Body | Content-Type |
//! |---|---|---|
//! | [`Payload::Markup`] | the markup text | `application/xml` |
//! | [`Payload::Text`] | the text, unchanged | `application/octet-stream` |
//! | [`Payload::Structured`] | compact JSON | `application/json` |
//!
//! ```
//! use horizon_fetch::Payload;
//! use serde_json::json;
//!
//! let payload = Payload::from(json!({"a": 1}));
//! assert_eq!(payload.content_type(), "application/json");
//! assert_eq!(payload.into_body(), r#"{"a":1}"#);
//! ```

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;

use crate::error::PayloadError;

/// Content type of markup payloads.
pub const CONTENT_TYPE_XML: &str = "application/xml";

/// Content type of plain text payloads.
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Content type of structured payloads.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Well-formed XML text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// Check that `text` is a well-formed document with a root element.
    pub fn parse(text: impl Into<String>) -> Result<Self, PayloadError> {
        let text = text.into();
        let mut reader = Reader::from_str(&text);
        let mut depth = 0usize;
        let mut roots = 0usize;

        loop {
            match reader.read_event()? {
                Event::Start(_) => {
                    if depth == 0 {
                        roots += 1;
                    }
                    depth += 1;
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Empty(_) if depth == 0 => roots += 1,
                Event::Eof => break,
                _ => {}
            }
        }

        if depth != 0 {
            return Err(PayloadError::Markup(format!("{depth} unclosed element(s)")));
        }
        if roots != 1 {
            return Err(PayloadError::Markup(format!(
                "expected one root element, found {roots}"
            )));
        }
        Ok(Self(text))
    }

    /// The markup text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the markup text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Markup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of a `send` request.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// An XML document.
    Markup(Markup),
    /// Plain text, sent as-is.
    Text(String),
    /// Any other value, sent as JSON.
    Structured(serde_json::Value),
}

impl Payload {
    /// Serialize `value` into a structured payload.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, PayloadError> {
        Ok(Self::Structured(serde_json::to_value(value)?))
    }

    /// Serialize `value` into a markup payload.
    pub fn xml<T: Serialize + ?Sized>(value: &T) -> Result<Self, PayloadError> {
        let text = quick_xml::se::to_string(value)?;
        Ok(Self::Markup(Markup(text)))
    }

    /// Validate `text` as XML and wrap it as a markup payload.
    pub fn markup(text: impl Into<String>) -> Result<Self, PayloadError> {
        Ok(Self::Markup(Markup::parse(text)?))
    }

    /// The content type inferred from the payload's shape.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Markup(_) => CONTENT_TYPE_XML,
            Self::Text(_) => CONTENT_TYPE_OCTET_STREAM,
            Self::Structured(_) => CONTENT_TYPE_JSON,
        }
    }

    /// Render the request body.
    pub fn into_body(self) -> String {
        match self {
            Self::Markup(markup) => markup.into_string(),
            Self::Text(text) => text,
            Self::Structured(value) => value.to_string(),
        }
    }
}

impl From<Markup> for Payload {
    fn from(markup: Markup) -> Self {
        Self::Markup(markup)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}
