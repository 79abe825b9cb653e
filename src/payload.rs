//! # Payloads
//!
//! A payload is a single JSON scalar. Its canonical text is what gets signed
//! and what is base64url-encoded into the compact form:
//!
//! | Payload          | Canonical text          |
//! |------------------|-------------------------|
//! | `String("ab")`   | `"ab"` (JSON-escaped)   |
//! | `Bool(true)`     | `true`                  |
//! | `Integer(-7)`    | `-7`                    |
//! | `Float(1.5)`     | `1.5`                   |
//! | `Null`           | `null`                  |
//! | `Absent`         | *(no text)*             |
//!
//! When decoding, a number is a float if and only if its text contains `.`,
//! `e` or `E`; otherwise it is an integer and must fit in an `i64`.

use std::fmt::{self, Display};

use crate::{Error, Result};

/// A single payload value.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// An undisclosed position in a presentation. Carries no signature block.
    Absent,

    /// JSON `null`.
    Null,

    /// JSON boolean.
    Bool(bool),

    /// JSON integer.
    Integer(i64),

    /// JSON floating point number.
    Float(f64),

    /// JSON string.
    String(String),
}

impl Payload {
    /// Canonical text of the payload.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => serde_json::to_string(f).unwrap_or_else(|_| "null".to_string()),
            Self::String(s) => serde_json::Value::String(s.clone()).to_string(),
        }
    }

    /// Decode canonical text back into a payload.
    ///
    /// Only the exact text [`Payload::to_text`] produces is accepted, so the
    /// transmitted bytes are always the bytes that were signed.
    ///
    /// # Errors
    ///
    /// Returns a format error if the text is not a JSON scalar, is an integer
    /// outside the `i64` range, or is not in canonical form.
    pub fn from_text(text: &str) -> Result<Self> {
        let payload = Self::decode(text)?;
        if payload.to_text() != text {
            return Err(Error::Format(format!("payload is not in canonical form: {text}")));
        }
        Ok(payload)
    }

    fn decode(text: &str) -> Result<Self> {
        match text {
            "" => return Ok(Self::Absent),
            "null" => return Ok(Self::Null),
            "true" => return Ok(Self::Bool(true)),
            "false" => return Ok(Self::Bool(false)),
            _ => {}
        }

        if text.starts_with('"') {
            return serde_json::from_str(text)
                .map(Self::String)
                .map_err(|e| Error::Format(format!("invalid string payload: {e}")));
        }

        if !text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
            return Err(Error::Format(format!("payload is not a JSON scalar: {text}")));
        }

        if text.contains(['.', 'e', 'E']) {
            let number: serde_json::Number = serde_json::from_str(text)
                .map_err(|e| Error::Format(format!("invalid number payload: {e}")))?;
            let value = number
                .as_f64()
                .ok_or_else(|| Error::Format(format!("invalid number payload: {text}")))?;
            return Ok(Self::Float(value));
        }

        // reject JSON-invalid forms such as leading zeros before parsing
        let _: serde_json::Number = serde_json::from_str(text)
            .map_err(|e| Error::Format(format!("invalid number payload: {e}")))?;
        text.parse::<i64>()
            .map(Self::Integer)
            .map_err(|_| Error::Format(format!("integer payload out of range: {text}")))
    }

    /// Whether the payload is the absent marker.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether the payload is disclosed (anything other than absent).
    #[must_use]
    pub const fn is_disclosed(&self) -> bool {
        !self.is_absent()
    }

    /// Whether a payload can be issued (finite, and not absent).
    #[must_use]
    pub const fn is_issuable(&self) -> bool {
        match self {
            Self::Absent => false,
            Self::Float(f) => f.is_finite(),
            _ => true,
        }
    }

    /// The string value, if this is a string payload.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean value, if this is a boolean payload.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer value, if this is an integer payload.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The numeric value as a float, for integer or float payloads.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("<absent>"),
            _ => f.write_str(&self.to_text()),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Payload {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Payload {
    fn from(i: i32) -> Self {
        Self::Integer(i.into())
    }
}

impl From<f64> for Payload {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl<T: Into<Self>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_text() {
        assert_eq!(Payload::from("Gabriel").to_text(), "\"Gabriel\"");
        assert_eq!(Payload::from("").to_text(), "\"\"");
        assert_eq!(Payload::from("say \"hi\"").to_text(), r#""say \"hi\"""#);
        assert_eq!(Payload::from(true).to_text(), "true");
        assert_eq!(Payload::from(-7).to_text(), "-7");
        assert_eq!(Payload::from(1.5).to_text(), "1.5");
        assert_eq!(Payload::from(2.0).to_text(), "2.0");
        assert_eq!(Payload::Null.to_text(), "null");
        assert_eq!(Payload::Absent.to_text(), "");
    }

    #[test]
    fn decode_scalars() {
        assert_eq!(Payload::from_text("\"Bauman\"").expect("string"), Payload::from("Bauman"));
        assert_eq!(Payload::from_text("\"\"").expect("empty string"), Payload::from(""));
        assert_eq!(Payload::from_text("false").expect("bool"), Payload::Bool(false));
        assert_eq!(Payload::from_text("3").expect("int"), Payload::Integer(3));
        assert_eq!(Payload::from_text("-3").expect("int"), Payload::Integer(-3));
        assert_eq!(Payload::from_text("3.0").expect("float"), Payload::Float(3.0));
        assert_eq!(Payload::from_text("-1.25").expect("float"), Payload::Float(-1.25));
        assert_eq!(Payload::from_text("1e20").expect("float"), Payload::Float(1e20));
        assert_eq!(Payload::from_text("null").expect("null"), Payload::Null);
        assert_eq!(Payload::from_text("").expect("absent"), Payload::Absent);
    }

    #[test]
    fn integer_grammar() {
        // integer text never becomes a float, however large
        assert_eq!(
            Payload::from_text("9223372036854775807").expect("max"),
            Payload::Integer(i64::MAX)
        );
        assert!(matches!(Payload::from_text("9223372036854775808"), Err(Error::Format(_))));
        assert!(Payload::from_text("01").is_err());
    }

    #[test]
    fn rejects_non_canonical() {
        // each decodes to a value whose canonical text differs
        for text in ["1.50", "1e3", "-0", "3 ", " 3", "\"\\u0047abriel\"", "\"a\\/b\"", "true "] {
            assert!(matches!(Payload::from_text(text), Err(Error::Format(_))), "{text} should be rejected");
        }
        assert_eq!(Payload::from_text("\"Gabriel\"").expect("canonical"), Payload::from("Gabriel"));
    }

    #[test]
    fn rejects_non_scalars() {
        assert!(Payload::from_text("{}").is_err());
        assert!(Payload::from_text("[1]").is_err());
        assert!(Payload::from_text("Gabriel").is_err());
        assert!(Payload::from_text("\"open").is_err());
    }

    #[test]
    fn absent_is_distinct() {
        assert_ne!(Payload::Absent, Payload::Null);
        assert_ne!(Payload::Absent, Payload::from(""));
        assert!(!Payload::Absent.is_issuable());
        assert!(!Payload::Float(f64::NAN).is_issuable());
        assert!(Payload::from("").is_disclosed());
    }

    #[test]
    fn accessors() {
        assert_eq!(Payload::from("x").as_str(), Some("x"));
        assert_eq!(Payload::from(true).as_bool(), Some(true));
        assert_eq!(Payload::from(4).as_i64(), Some(4));
        assert_eq!(Payload::from(4).as_f64(), Some(4.0));
        assert_eq!(Payload::from(None::<i64>), Payload::Null);
        assert_eq!(Payload::Absent.as_str(), None);
    }
}
