//! `serde::Serializer` that captures any `Serialize` value as a [`FieldValue`] tree.
//!
//! Translation rules:
//!
//! - `i8`..`i64`, `f32`, `f64` become [`FieldValue::Number`] with their width
//! - strings become [`FieldValue::Text`]
//! - seqs become [`FieldValue::Sequence`]; byte strings become a sequence of
//!   [`FieldValue::Other`] so that only their length is observable
//! - structs become [`FieldValue::Record`]; fields dropped by
//!   `skip_serializing_if` become [`FieldValue::Skipped`], fields marked
//!   `skip_serializing` are left out
//! - maps of unknown length with string keys become [`FieldValue::Record`].
//!   This is how serde emits a struct with `#[serde(flatten)]` fields, so the
//!   flattened fields land in the same record as their siblings
//! - newtype structs are transparent, except the [`DateTime`] marker newtype
//!   which becomes [`FieldValue::DateTime`]
//! - everything else (bool, unsigned, 128-bit, char, option, unit, enum,
//!   tuple, sized map) becomes [`FieldValue::Other`] without visiting its
//!   contents

use std::fmt::Display;

use serde::ser::{
    Impossible, Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
    SerializeTuple, SerializeTupleStruct, SerializeTupleVariant, Serializer,
};

use crate::datetime::{DateTime, DATETIME_NEWTYPE};
use crate::value::{FieldValue, Number, Record};

/// Errors raised while capturing a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// Raised by the value's own `Serialize` impl.
    #[error("{0}")]
    Custom(String),
    /// The date-time marker carried text that is not RFC 3339.
    #[error("invalid date-time {text:?}: {reason}")]
    DateTime { text: String, reason: String },
}

impl serde::ser::Error for CaptureError {
    fn custom<T: Display>(msg: T) -> Self {
        CaptureError::Custom(msg.to_string())
    }
}

/// Captures `value` as a [`FieldValue`] tree.
///
/// # Errors
///
/// Returns [`CaptureError`] when the value's `Serialize` impl fails.
pub fn to_field_value<T: Serialize + ?Sized>(value: &T) -> Result<FieldValue> {
    value.serialize(FieldSerializer)
}

struct FieldSerializer;

type Result<T> = std::result::Result<T, CaptureError>;

impl Serializer for FieldSerializer {
    type Ok = FieldValue;
    type Error = CaptureError;
    type SerializeSeq = SeqCapture;
    type SerializeTuple = Ignored;
    type SerializeTupleStruct = Ignored;
    type SerializeTupleVariant = Ignored;
    type SerializeMap = MapCapture;
    type SerializeStruct = RecordCapture;
    type SerializeStructVariant = Ignored;

    fn serialize_bool(self, _v: bool) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_i8(self, v: i8) -> Result<FieldValue> {
        Ok(FieldValue::Number(Number::I8(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<FieldValue> {
        Ok(FieldValue::Number(Number::I16(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<FieldValue> {
        Ok(FieldValue::Number(Number::I32(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<FieldValue> {
        Ok(FieldValue::Number(Number::I64(v)))
    }

    fn serialize_u8(self, _v: u8) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_u16(self, _v: u16) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_u32(self, _v: u32) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_u64(self, _v: u64) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_i128(self, _v: i128) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_u128(self, _v: u128) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_f32(self, v: f32) -> Result<FieldValue> {
        Ok(FieldValue::Number(Number::F32(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<FieldValue> {
        Ok(FieldValue::Number(Number::F64(v)))
    }

    fn serialize_char(self, _v: char) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_str(self, v: &str) -> Result<FieldValue> {
        Ok(FieldValue::Text(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<FieldValue> {
        Ok(FieldValue::Sequence(vec![FieldValue::Other; v.len()]))
    }

    fn serialize_none(self) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_some<T>(self, _value: &T) -> Result<FieldValue>
    where
        T: Serialize + ?Sized,
    {
        Ok(FieldValue::Other)
    }

    fn serialize_unit(self) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<FieldValue>
    where
        T: Serialize + ?Sized,
    {
        if name != DATETIME_NEWTYPE {
            return value.serialize(self);
        }
        let text = value.serialize(TextSerializer)?;
        DateTime::parse(&text)
            .map(FieldValue::DateTime)
            .map_err(|err| CaptureError::DateTime {
                text,
                reason: err.to_string(),
            })
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<FieldValue>
    where
        T: Serialize + ?Sized,
    {
        Ok(FieldValue::Other)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqCapture> {
        Ok(SeqCapture {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Ignored> {
        Ok(Ignored)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Ignored> {
        Ok(Ignored)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Ignored> {
        Ok(Ignored)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapCapture> {
        Ok(MapCapture {
            fields: len.is_none().then(Vec::new),
            key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<RecordCapture> {
        Ok(RecordCapture {
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Ignored> {
        Ok(Ignored)
    }
}

struct SeqCapture {
    items: Vec<FieldValue>,
}

impl SerializeSeq for SeqCapture {
    type Ok = FieldValue;
    type Error = CaptureError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<FieldValue> {
        Ok(FieldValue::Sequence(self.items))
    }
}

struct RecordCapture {
    fields: Vec<(String, FieldValue)>,
}

impl SerializeStruct for RecordCapture {
    type Ok = FieldValue;
    type Error = CaptureError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.fields
            .push((key.to_string(), value.serialize(FieldSerializer)?));
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        self.fields.push((key.to_string(), FieldValue::Skipped));
        Ok(())
    }

    fn end(self) -> Result<FieldValue> {
        Ok(FieldValue::Record(self.fields.into_iter().collect::<Record>()))
    }
}

/// Accepts the contents of kinds the validator never inspects.
struct Ignored;

impl SerializeTuple for Ignored {
    type Ok = FieldValue;
    type Error = CaptureError;

    fn serialize_element<T>(&mut self, _value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        Ok(())
    }

    fn end(self) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }
}

impl SerializeTupleStruct for Ignored {
    type Ok = FieldValue;
    type Error = CaptureError;

    fn serialize_field<T>(&mut self, _value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        Ok(())
    }

    fn end(self) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }
}

impl SerializeTupleVariant for Ignored {
    type Ok = FieldValue;
    type Error = CaptureError;

    fn serialize_field<T>(&mut self, _value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        Ok(())
    }

    fn end(self) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }
}

/// Collects the entries of a length-less map as record fields. `fields` is
/// `None` for sized maps and once a key turns out not to be a string; the map
/// is then captured as [`FieldValue::Other`].
struct MapCapture {
    fields: Option<Vec<(String, FieldValue)>>,
    key: Option<String>,
}

impl SerializeMap for MapCapture {
    type Ok = FieldValue;
    type Error = CaptureError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if self.fields.is_none() {
            return Ok(());
        }
        match key.serialize(TextSerializer) {
            Ok(key) => self.key = Some(key),
            Err(_) => self.fields = None,
        }
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let (Some(fields), Some(key)) = (self.fields.as_mut(), self.key.take()) else {
            return Ok(());
        };
        fields.push((key, value.serialize(FieldSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<FieldValue> {
        Ok(match self.fields {
            Some(fields) => FieldValue::Record(fields.into_iter().collect()),
            None => FieldValue::Other,
        })
    }
}

impl SerializeStructVariant for Ignored {
    type Ok = FieldValue;
    type Error = CaptureError;

    fn serialize_field<T>(&mut self, _key: &'static str, _value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        Ok(())
    }

    fn end(self) -> Result<FieldValue> {
        Ok(FieldValue::Other)
    }
}

/// Extracts the string payload of the date-time marker newtype.
struct TextSerializer;

impl TextSerializer {
    fn unexpected() -> CaptureError {
        CaptureError::Custom("date-time marker must wrap a string".to_string())
    }
}

macro_rules! reject_scalar {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<String> {
                Err(Self::unexpected())
            }
        )*
    };
}

impl Serializer for TextSerializer {
    type Ok = String;
    type Error = CaptureError;
    type SerializeSeq = Impossible<String, CaptureError>;
    type SerializeTuple = Impossible<String, CaptureError>;
    type SerializeTupleStruct = Impossible<String, CaptureError>;
    type SerializeTupleVariant = Impossible<String, CaptureError>;
    type SerializeMap = Impossible<String, CaptureError>;
    type SerializeStruct = Impossible<String, CaptureError>;
    type SerializeStructVariant = Impossible<String, CaptureError>;

    reject_scalar! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
        serialize_bytes: &[u8],
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_none(self) -> Result<String> {
        Err(Self::unexpected())
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        Err(Self::unexpected())
    }

    fn serialize_unit(self) -> Result<String> {
        Err(Self::unexpected())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(Self::unexpected())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<String> {
        Err(Self::unexpected())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        Err(Self::unexpected())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Self::unexpected())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Self::unexpected())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Self::unexpected())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Self::unexpected())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Self::unexpected())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Self::unexpected())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Self::unexpected())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Inner {
        label: String,
    }

    #[derive(Serialize)]
    struct Outer {
        small: i8,
        wide: i64,
        ratio: f32,
        name: String,
        inner: Inner,
        list: Vec<Inner>,
        at: DateTime,
        flag: bool,
        count: u32,
        maybe: Option<i32>,
        extra: BTreeMap<String, i32>,
        pair: (i32, i32),
        #[serde(skip_serializing)]
        #[allow(dead_code)]
        hidden: i32,
    }

    fn sample() -> Outer {
        Outer {
            small: 3,
            wide: -1,
            ratio: 0.5,
            name: "n".into(),
            inner: Inner { label: String::new() },
            list: vec![Inner { label: "a".into() }],
            at: DateTime::default(),
            flag: true,
            count: 0,
            maybe: None,
            extra: BTreeMap::new(),
            pair: (0, 0),
            hidden: 0,
        }
    }

    // ---- Struct capture ----

    #[test]
    fn struct_fields_are_captured_in_order() {
        let FieldValue::Record(record) = to_field_value(&sample()).expect("capture") else {
            panic!("expected record");
        };
        let names: Vec<&str> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["small", "wide", "ratio", "name", "inner", "list", "at", "flag", "count", "maybe", "extra", "pair"]
        );
    }

    #[test]
    fn numbers_keep_their_width() {
        let FieldValue::Record(record) = to_field_value(&sample()).expect("capture") else {
            panic!("expected record");
        };
        assert_eq!(record.get("small"), Some(&FieldValue::Number(Number::I8(3))));
        assert_eq!(record.get("wide"), Some(&FieldValue::Number(Number::I64(-1))));
        assert_eq!(record.get("ratio"), Some(&FieldValue::Number(Number::F32(0.5))));
    }

    #[test]
    fn nested_structs_become_records() {
        let FieldValue::Record(record) = to_field_value(&sample()).expect("capture") else {
            panic!("expected record");
        };
        let inner = Record::new().with("label", FieldValue::Text(String::new()));
        assert_eq!(record.get("inner"), Some(&FieldValue::Record(inner)));
        let element = Record::new().with("label", FieldValue::Text("a".into()));
        assert_eq!(
            record.get("list"),
            Some(&FieldValue::Sequence(vec![FieldValue::Record(element)]))
        );
    }

    #[test]
    fn datetime_marker_is_recognised() {
        let FieldValue::Record(record) = to_field_value(&sample()).expect("capture") else {
            panic!("expected record");
        };
        assert_eq!(record.get("at"), Some(&FieldValue::DateTime(DateTime::ZERO)));
    }

    #[test]
    fn uninspected_kinds_collapse_to_other() {
        let FieldValue::Record(record) = to_field_value(&sample()).expect("capture") else {
            panic!("expected record");
        };
        for name in ["flag", "count", "maybe", "extra", "pair"] {
            assert_eq!(record.get(name), Some(&FieldValue::Other), "field {name}");
        }
    }

    // ---- Scalars and wrappers ----

    #[test]
    fn plain_newtypes_are_transparent() {
        #[derive(Serialize)]
        struct Amount(f64);
        assert_eq!(
            to_field_value(&Amount(0.0)).expect("capture"),
            FieldValue::Number(Number::F64(0.0))
        );
    }

    #[test]
    fn bytes_expose_only_their_length() {
        struct Raw(Vec<u8>);
        impl Serialize for Raw {
            fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.serialize_bytes(&self.0)
            }
        }
        assert_eq!(
            to_field_value(&Raw(vec![1, 2])).expect("capture"),
            FieldValue::Sequence(vec![FieldValue::Other, FieldValue::Other])
        );
    }

    #[test]
    fn unit_enum_variants_are_other() {
        #[derive(Serialize)]
        enum Status {
            Active,
        }
        assert_eq!(to_field_value(&Status::Active).expect("capture"), FieldValue::Other);
    }

    #[test]
    fn wide_integers_are_other() {
        #[derive(Serialize)]
        struct Wide {
            signed: i128,
            unsigned: u128,
        }

        let captured = to_field_value(&Wide { signed: 0, unsigned: 5 }).expect("capture");
        let expected = Record::new()
            .with("signed", FieldValue::Other)
            .with("unsigned", FieldValue::Other);
        assert_eq!(captured, FieldValue::Record(expected));
    }

    #[test]
    fn isize_is_captured_as_int64() {
        assert_eq!(to_field_value(&0_isize).expect("capture"), FieldValue::Number(Number::I64(0)));
    }

    // ---- Skipped and flattened fields ----

    #[test]
    fn skip_serializing_if_fields_are_marked_skipped() {
        #[derive(Serialize)]
        struct Memo {
            #[serde(skip_serializing_if = "String::is_empty")]
            note: String,
            qty: i32,
        }

        let empty = to_field_value(&Memo { note: String::new(), qty: 1 }).expect("capture");
        let expected = Record::new()
            .with("note", FieldValue::Skipped)
            .with("qty", FieldValue::Number(Number::I32(1)));
        assert_eq!(empty, FieldValue::Record(expected));

        let FieldValue::Record(full) = to_field_value(&Memo { note: "x".into(), qty: 1 }).expect("capture") else {
            panic!("expected record");
        };
        assert_eq!(full.get("note"), Some(&FieldValue::Text("x".into())));
    }

    #[test]
    fn flattened_fields_join_the_parent_record() {
        #[derive(Serialize)]
        struct Detail {
            name: String,
            qty: i32,
        }

        #[derive(Serialize)]
        struct Flat {
            code: String,
            #[serde(flatten)]
            detail: Detail,
        }

        let flat = Flat {
            code: "A".into(),
            detail: Detail { name: String::new(), qty: 0 },
        };
        let expected = Record::new()
            .with("code", FieldValue::Text("A".into()))
            .with("name", FieldValue::Text(String::new()))
            .with("qty", FieldValue::Number(Number::I32(0)));
        assert_eq!(to_field_value(&flat).expect("capture"), FieldValue::Record(expected));
    }

    #[test]
    fn unsized_map_with_non_text_keys_is_other() {
        struct Keyed;
        impl Serialize for Keyed {
            fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                let mut map = s.serialize_map(None)?;
                map.serialize_entry(&1_i32, "one")?;
                map.serialize_entry(&2_i32, "two")?;
                map.end()
            }
        }

        assert_eq!(to_field_value(&Keyed).expect("capture"), FieldValue::Other);
    }

    #[test]
    fn sized_maps_stay_other() {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), String::new());
        assert_eq!(to_field_value(&map).expect("capture"), FieldValue::Other);
    }

    // ---- Errors ----

    #[test]
    fn custom_serialize_errors_propagate() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: Serializer>(&self, _s: S) -> std::result::Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot serialize"))
            }
        }
        assert_eq!(
            to_field_value(&Broken),
            Err(CaptureError::Custom("cannot serialize".to_string()))
        );
    }

    #[test]
    fn marker_with_bad_text_is_rejected() {
        struct Fake;
        impl Serialize for Fake {
            fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.serialize_newtype_struct(DATETIME_NEWTYPE, "not a date")
            }
        }
        let err = to_field_value(&Fake).expect_err("bad date-time text");
        assert!(matches!(err, CaptureError::DateTime { ref text, .. } if text == "not a date"));
    }
}
