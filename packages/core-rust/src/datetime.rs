//! RFC 3339 date-time field type.
//!
//! [`DateTime`] is the only destination field type with a custom conversion
//! rule: a JSON string is parsed as RFC 3339 while decoding, and a value that
//! does not parse fails the whole decode. The same format is used when the
//! value is serialized back to JSON.
//!
//! The default value is the zero date-time `0001-01-01T00:00:00Z`, which the
//! validator reports as missing.

use std::fmt;
use std::ops::Deref;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::datetime;
use time::OffsetDateTime;

/// Newtype name used by [`DateTime`]'s `Serialize` impl. The field capture
/// serializer recognises it to classify the value as a date-time rather than
/// plain text.
pub(crate) const DATETIME_NEWTYPE: &str = "$j2s::DateTime";

const ZERO: OffsetDateTime = datetime!(0001-01-01 00:00:00 UTC);

/// A timestamp decoded from and encoded to RFC 3339 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateTime(OffsetDateTime);

impl DateTime {
    /// The zero date-time, `0001-01-01T00:00:00Z`.
    pub const ZERO: DateTime = DateTime(ZERO);

    #[must_use]
    pub const fn new(inner: OffsetDateTime) -> Self {
        Self(inner)
    }

    /// Parses RFC 3339 text such as `2024-03-01T12:30:00+07:00`.
    ///
    /// # Errors
    ///
    /// Returns the parser error when `text` is not valid RFC 3339.
    pub fn parse(text: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(text, &Rfc3339).map(Self)
    }

    /// Formats the value as RFC 3339.
    ///
    /// # Errors
    ///
    /// Fails for values RFC 3339 cannot express (years outside `0..=9999`
    /// or offsets with seconds).
    pub fn format(&self) -> Result<String, time::error::Format> {
        self.0.format(&Rfc3339)
    }

    /// Whether this is the zero date-time. Compares the instant, so any
    /// offset representation of `0001-01-01T00:00:00Z` counts.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == ZERO
    }

    #[must_use]
    pub const fn into_inner(self) -> OffsetDateTime {
        self.0
    }
}

impl Default for DateTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Deref for DateTime {
    type Target = OffsetDateTime;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<OffsetDateTime> for DateTime {
    fn from(inner: OffsetDateTime) -> Self {
        Self(inner)
    }
}

impl From<DateTime> for OffsetDateTime {
    fn from(value: DateTime) -> Self {
        value.0
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for DateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.format().map_err(serde::ser::Error::custom)?;
        serializer.serialize_newtype_struct(DATETIME_NEWTYPE, &text)
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(DateTimeVisitor)
    }
}

struct DateTimeVisitor;

impl Visitor<'_> for DateTimeVisitor {
    type Value = DateTime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an RFC 3339 date-time string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        DateTime::parse(v).map_err(|err| E::custom(format_args!("parsing time {v:?}: {err}")))
    }
}
