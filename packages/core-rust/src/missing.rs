//! Missing-field detection over captured [`Record`]s.
//!
//! A field is missing when it still holds its zero value:
//!
//! | kind | missing when | fragment |
//! |---|---|---|
//! | signed integer, float | `== 0` (the `-1` sentinel is never missing) | `key(int32)` |
//! | text | empty and not the literal `"null"` | `key(string)` |
//! | sequence | empty | `key[...]` |
//! | sequence of records | per element with missing children | `key[`, children, `]` |
//! | date-time | the zero date-time | `key` |
//! | skipped by `skip_serializing_if` | always | `key` |
//! | record | has missing children | `key{`, children, `}` |
//!
//! Fragments are flat; nesting is expressed by the bracket entries
//! surrounding the children. Sequences of non-record elements are only checked
//! for emptiness.

use std::fmt;

use serde::Serialize;

use crate::capture::{to_field_value, CaptureError};
use crate::value::{FieldValue, Number, Record};

/// Numeric value meaning "intentionally absent".
pub const SENTINEL: i8 = -1;

/// Text that counts as present even though it carries no data.
pub const NULL_TEXT: &str = "null";

/// Ordered path fragments of the fields left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingFields(Vec<String>);

impl MissingFields {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Fragments joined with `", "`.
impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Walks `record` depth-first in field order and collects missing fragments.
#[must_use]
pub fn find_missing(record: &Record) -> MissingFields {
    let mut out = Vec::new();
    collect(record, &mut out);
    MissingFields(out)
}

/// Captures `value` and reports its missing fields. Values that do not
/// serialize as a struct have no fields and report nothing.
///
/// # Errors
///
/// Returns [`CaptureError`] when `value` fails to serialize.
pub fn missing_fields<T: Serialize + ?Sized>(value: &T) -> Result<MissingFields, CaptureError> {
    match to_field_value(value)? {
        FieldValue::Record(record) => Ok(find_missing(&record)),
        _ => Ok(MissingFields::default()),
    }
}

fn collect(record: &Record, out: &mut Vec<String>) {
    for (key, value) in record.iter() {
        match value {
            FieldValue::Number(number) => {
                if is_unset(*number) {
                    out.push(format!("{key}({})", number.kind()));
                }
            }
            FieldValue::Text(text) => {
                if text.is_empty() && text != NULL_TEXT {
                    out.push(format!("{key}(string)"));
                }
            }
            FieldValue::Sequence(items) => {
                if items.is_empty() {
                    out.push(format!("{key}[...]"));
                    continue;
                }
                for item in items {
                    if let FieldValue::Record(element) = item {
                        wrap(element, format!("{key}["), "]", out);
                    }
                }
            }
            FieldValue::DateTime(at) => {
                if at.is_zero() {
                    out.push(key.to_string());
                }
            }
            FieldValue::Record(child) => wrap(child, format!("{key}{{"), "}", out),
            FieldValue::Skipped => out.push(key.to_string()),
            FieldValue::Other => {}
        }
    }
}

/// Emits `open`, the children of `record`, `close` when `record` has misses.
fn wrap(record: &Record, open: String, close: &str, out: &mut Vec<String>) {
    let mut children = Vec::new();
    collect(record, &mut children);
    if children.is_empty() {
        return;
    }
    out.push(open);
    out.append(&mut children);
    out.push(close.to_string());
}

#[allow(clippy::float_cmp)]
fn is_unset(number: Number) -> bool {
    match number {
        Number::I8(v) => v == 0 && v != SENTINEL,
        Number::I16(v) => v == 0 && v != i16::from(SENTINEL),
        Number::I32(v) => v == 0 && v != i32::from(SENTINEL),
        Number::I64(v) => v == 0 && v != i64::from(SENTINEL),
        Number::F32(v) => v == 0.0 && v != f32::from(SENTINEL),
        Number::F64(v) => v == 0.0 && v != f64::from(SENTINEL),
    }
}
