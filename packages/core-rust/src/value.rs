//! Tagged field values used by the missing-field walk.
//!
//! A destination structure is captured into a [`FieldValue`] tree (see
//! [`crate::capture`]) and the validator only ever looks at this tree, never
//! at the caller's concrete type. Only the kinds that have an emptiness rule
//! get their own variant; everything else collapses into [`FieldValue::Other`].

use crate::datetime::DateTime;

/// Signed numeric value, tagged with its declared width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Number {
    /// Kind name used in missing-field fragments (`int8` ... `float64`).
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Number::I8(_) => "int8",
            Number::I16(_) => "int16",
            Number::I32(_) => "int32",
            Number::I64(_) => "int64",
            Number::F32(_) => "float32",
            Number::F64(_) => "float64",
        }
    }
}

/// One captured value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(Number),
    Text(String),
    Sequence(Vec<FieldValue>),
    Record(Record),
    DateTime(DateTime),
    /// A struct field left out by its `skip_serializing_if` predicate, which
    /// declares the value empty.
    Skipped,
    /// Booleans, unsigned and 128-bit integers, chars, options, sized maps,
    /// enums, tuples and unit values. Never classified as missing.
    Other,
}

/// Named fields of a captured struct, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.push((name.into(), value));
    }

    /// Builder-style [`push`](Record::push).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.push(name, value);
        self
    }

    /// First field with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
