//! Argument decoding pipeline: parse → decode → capture → validate.
//!
//! The input must be a JSON object. It is decoded onto the destination type
//! through serde, then the decoded value is captured as a
//! [`FieldValue`](crate::FieldValue) tree and checked for empty fields.
//!
//! Destination types should carry `#[serde(default)]` so that absent keys
//! fall back to zero values and are reported by the missing-field check
//! rather than rejected by serde as a decode error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::capture::to_field_value;
use crate::error::DecodeError;
use crate::missing::find_missing;
use crate::response::Response;
use crate::value::{FieldValue, Record};

/// Decoder behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Reject object keys the destination does not consume. Keys are reported
    /// as dotted paths (`owner.nick`, `items[1].sku`).
    ///
    /// Keys are matched against the names the destination serializes under.
    /// Fields marked `skip_serializing`, keys accepted through
    /// `#[serde(alias)]` and deserialize-only renames are therefore reported
    /// as unused even though decoding consumed them.
    pub error_unused: bool,
    /// Drop object members whose value is `null` before decoding, so the
    /// field keeps its default and is reported as missing.
    pub null_as_absent: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            error_unused: false,
            null_as_absent: true,
        }
    }
}

/// Decodes JSON argument strings into destination types and validates them.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes `args` into a new `T` and checks that every field is populated.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] for syntax errors, type mismatches, unused keys
    /// (when enabled) and missing fields.
    pub fn decode<T>(&self, args: &str) -> Result<T, DecodeError>
    where
        T: DeserializeOwned + Serialize,
    {
        let (value, source) = self.parse_and_decode::<T>(args)?;
        self.validate(&value, &source)?;
        Ok(value)
    }

    /// Decodes `args` into `dest` and reports the outcome as a [`Response`].
    ///
    /// `dest` is left untouched when parsing or decoding fails. On a
    /// missing-field failure it already holds the decoded value.
    pub fn decode_into<T>(&self, args: &str, dest: &mut T) -> Response
    where
        T: DeserializeOwned + Serialize,
    {
        let outcome = self.parse_and_decode::<T>(args).and_then(|(value, source)| {
            *dest = value;
            self.validate(&*dest, &source)
        });
        let response = Response::from(outcome);
        debug!(code = %response.code, "argument decode finished");
        response
    }

    fn parse_and_decode<T: DeserializeOwned>(&self, args: &str) -> Result<(T, Value), DecodeError> {
        let mut object: Map<String, Value> = serde_json::from_str(args).map_err(|err| {
            debug!(error = %err, "argument text is not a JSON object");
            DecodeError::Syntax(err)
        })?;
        if self.config.null_as_absent {
            strip_nulls(&mut object);
        }

        let source = Value::Object(object);
        let value = T::deserialize(&source).map_err(|err| {
            debug!(error = %err, "argument object does not fit destination");
            DecodeError::Convert(err)
        })?;
        Ok((value, source))
    }

    fn validate<T: Serialize>(&self, value: &T, source: &Value) -> Result<(), DecodeError> {
        let record = match to_field_value(value)? {
            FieldValue::Record(record) => record,
            _ => {
                warn!("destination does not serialize as a struct; nothing to validate");
                Record::new()
            }
        };

        if let (true, Value::Object(object)) = (self.config.error_unused, source) {
            let mut unused = Vec::new();
            collect_unused(object, &record, "", &mut unused);
            if !unused.is_empty() {
                return Err(DecodeError::UnusedKeys(unused));
            }
        }

        let missing = find_missing(&record);
        if missing.is_empty() {
            Ok(())
        } else {
            debug!(count = missing.len(), "destination has missing fields");
            Err(DecodeError::MissingFields(missing))
        }
    }
}

/// Decodes `args` into `dest` with the default [`DecoderConfig`].
pub fn parse_args_into<T>(args: &str, dest: &mut T) -> Response
where
    T: DeserializeOwned + Serialize,
{
    Decoder::default().decode_into(args, dest)
}

/// Decodes `args` into a new `T` with the default [`DecoderConfig`].
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn from_args<T>(args: &str) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Serialize,
{
    Decoder::default().decode(args)
}

/// Removes `null` members from `object` and from every object nested in it.
fn strip_nulls(object: &mut Map<String, Value>) {
    object.retain(|_, value| !value.is_null());
    for value in object.values_mut() {
        strip_nulls_in(value);
    }
}

fn strip_nulls_in(value: &mut Value) {
    match value {
        Value::Object(object) => strip_nulls(object),
        Value::Array(items) => items.iter_mut().for_each(strip_nulls_in),
        _ => {}
    }
}

/// Collects keys of `object` that have no counterpart in `record`.
fn collect_unused(object: &Map<String, Value>, record: &Record, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in object {
        let path = format!("{prefix}{key}");
        match (record.get(key), value) {
            (None, _) => out.push(path),
            (Some(FieldValue::Record(child)), Value::Object(nested)) => {
                collect_unused(nested, child, &format!("{path}."), out);
            }
            (Some(FieldValue::Sequence(elements)), Value::Array(items)) => {
                for (index, (element, item)) in elements.iter().zip(items).enumerate() {
                    if let (FieldValue::Record(child), Value::Object(nested)) = (element, item) {
                        collect_unused(nested, child, &format!("{path}[{index}]."), out);
                    }
                }
            }
            _ => {}
        }
    }
}
