//! Nested data to flat path-keyed leaves.
//!
//! [`flatten`] drives a serde `Serializer` that writes each scalar straight
//! into a [`FlattenedState`] at its dotted path, so any `T: Serialize` can be
//! the live source of a provider. [`flatten_value`] walks an existing JSON
//! tree and cannot fail.

use crate::path::join;
use crate::{Data, FlattenedState, SyncError, SyncResult, Value};
use serde::ser::{self, Impossible, Serialize};
use std::fmt;

/// Flatten any serializable value into path-keyed leaves.
///
/// Walks depth-first from the root path `""`. Scalars (including null) are
/// stored at their path; sequences use ascending decimal indices and maps use
/// their keys in serialization order. Empty containers produce no entries.
///
/// Fails with [`SyncError::UnsupportedType`] naming the offending path for
/// non-finite floats, integers outside the 64-bit range and map keys that
/// are not strings, characters, integers or booleans. Nothing is returned on
/// failure.
///
/// # Examples
///
/// ```
/// use json_sync::{flatten, Value};
/// use serde_json::json;
///
/// let state = flatten(&json!({"foo": "bar", "baz": [true, null]})).unwrap();
/// assert_eq!(state.get("foo"), Some(&Value::from("bar")));
/// assert_eq!(state.get("baz.0"), Some(&Value::Bool(true)));
/// assert_eq!(state.get("baz.1"), Some(&Value::Null));
/// ```
pub fn flatten<T: Serialize + ?Sized>(data: &T) -> SyncResult<FlattenedState> {
    let mut out = FlattenedState::new();
    data.serialize(LeafSerializer {
        out: &mut out,
        path: String::new(),
    })
    .map_err(|e| e.or_path(""))?;
    Ok(out)
}

/// Flatten an in-memory JSON tree. Every JSON value is representable, so
/// this never fails.
pub fn flatten_value(data: &Data) -> FlattenedState {
    let mut out = FlattenedState::new();
    dig(&mut out, String::new(), data);
    out
}

fn dig(out: &mut FlattenedState, path: String, data: &Data) {
    match data {
        Data::Null => {
            out.insert(path, Value::Null);
        }
        Data::Bool(b) => {
            out.insert(path, Value::Bool(*b));
        }
        Data::Number(n) => {
            out.insert(path, Value::Number(n.clone()));
        }
        Data::String(s) => {
            out.insert(path, Value::String(s.clone()));
        }
        Data::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                dig(out, join(&path, &index.to_string()), item);
            }
        }
        Data::Object(map) => {
            for (key, child) in map {
                dig(out, join(&path, key), child);
            }
        }
    }
}

/// Error raised inside the serializer. The path is filled in by the nearest
/// serializer that knows where the failing value lives.
#[derive(Debug)]
struct FlattenError {
    path: Option<String>,
    kind: String,
}

impl FlattenError {
    fn at(path: &str, kind: impl Into<String>) -> Self {
        Self {
            path: Some(path.to_owned()),
            kind: kind.into(),
        }
    }

    fn key(kind: impl Into<String>) -> Self {
        Self {
            path: None,
            kind: kind.into(),
        }
    }

    fn or_path(mut self, path: &str) -> Self {
        if self.path.is_none() {
            self.path = Some(path.to_owned());
        }
        self
    }
}

impl fmt::Display for FlattenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "unsupported type at \"{}\": {}", path, self.kind),
            None => f.write_str(&self.kind),
        }
    }
}

impl std::error::Error for FlattenError {}

impl ser::Error for FlattenError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::key(msg.to_string())
    }
}

impl From<FlattenError> for SyncError {
    fn from(e: FlattenError) -> Self {
        SyncError::unsupported_type(e.path.unwrap_or_default(), e.kind)
    }
}

struct LeafSerializer<'a> {
    out: &'a mut FlattenedState,
    path: String,
}

impl LeafSerializer<'_> {
    fn leaf(self, value: Value) -> Result<(), FlattenError> {
        self.out.insert(self.path, value);
        Ok(())
    }

    fn float(self, v: f64) -> Result<(), FlattenError> {
        match Value::from_f64(v) {
            Some(value) => self.leaf(value),
            None => Err(FlattenError::at(&self.path, format!("non-finite float {}", v))),
        }
    }
}

impl<'a> ser::Serializer for LeafSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;

    type SerializeSeq = Compound<'a>;
    type SerializeTuple = Compound<'a>;
    type SerializeTupleStruct = Compound<'a>;
    type SerializeTupleVariant = Compound<'a>;
    type SerializeMap = MapCompound<'a>;
    type SerializeStruct = Compound<'a>;
    type SerializeStructVariant = Compound<'a>;

    fn serialize_bool(self, v: bool) -> Result<(), FlattenError> {
        self.leaf(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<(), FlattenError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<(), FlattenError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<(), FlattenError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<(), FlattenError> {
        self.leaf(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<(), FlattenError> {
        if let Ok(i) = i64::try_from(v) {
            return self.serialize_i64(i);
        }
        if let Ok(u) = u64::try_from(v) {
            return self.serialize_u64(u);
        }
        Err(FlattenError::at(&self.path, format!("integer {} out of range", v)))
    }

    fn serialize_u8(self, v: u8) -> Result<(), FlattenError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<(), FlattenError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<(), FlattenError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<(), FlattenError> {
        self.leaf(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<(), FlattenError> {
        match u64::try_from(v) {
            Ok(u) => self.serialize_u64(u),
            Err(_) => Err(FlattenError::at(&self.path, format!("integer {} out of range", v))),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<(), FlattenError> {
        self.float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), FlattenError> {
        self.float(v)
    }

    fn serialize_char(self, v: char) -> Result<(), FlattenError> {
        self.leaf(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<(), FlattenError> {
        self.leaf(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), FlattenError> {
        for (index, byte) in v.iter().enumerate() {
            self.out
                .insert(join(&self.path, &index.to_string()), u32::from(*byte));
        }
        Ok(())
    }

    fn serialize_none(self) -> Result<(), FlattenError> {
        self.leaf(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), FlattenError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), FlattenError> {
        self.leaf(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), FlattenError> {
        self.leaf(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), FlattenError> {
        self.leaf(Value::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), FlattenError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), FlattenError> {
        let path = join(&self.path, variant);
        value
            .serialize(LeafSerializer {
                out: self.out,
                path: path.clone(),
            })
            .map_err(|e| e.or_path(&path))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Compound<'a>, FlattenError> {
        Ok(Compound::new(self.out, self.path))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Compound<'a>, FlattenError> {
        Ok(Compound::new(self.out, self.path))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>, FlattenError> {
        Ok(Compound::new(self.out, self.path))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>, FlattenError> {
        let path = join(&self.path, variant);
        Ok(Compound::new(self.out, path))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapCompound<'a>, FlattenError> {
        Ok(MapCompound {
            out: self.out,
            path: self.path,
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>, FlattenError> {
        Ok(Compound::new(self.out, self.path))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>, FlattenError> {
        let path = join(&self.path, variant);
        Ok(Compound::new(self.out, path))
    }
}

/// Sequences, tuples and structs: children keyed by index or field name.
struct Compound<'a> {
    out: &'a mut FlattenedState,
    path: String,
    next_index: usize,
}

impl<'a> Compound<'a> {
    fn new(out: &'a mut FlattenedState, path: String) -> Self {
        Self {
            out,
            path,
            next_index: 0,
        }
    }

    fn child<T: ?Sized + Serialize>(&mut self, segment: &str, value: &T) -> Result<(), FlattenError> {
        let path = join(&self.path, segment);
        value
            .serialize(LeafSerializer {
                out: &mut *self.out,
                path: path.clone(),
            })
            .map_err(|e| e.or_path(&path))
    }

    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FlattenError> {
        let index = self.next_index.to_string();
        self.next_index += 1;
        self.child(&index, value)
    }
}

impl ser::SerializeSeq for Compound<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FlattenError> {
        self.element(value)
    }

    fn end(self) -> Result<(), FlattenError> {
        Ok(())
    }
}

impl ser::SerializeTuple for Compound<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FlattenError> {
        self.element(value)
    }

    fn end(self) -> Result<(), FlattenError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for Compound<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FlattenError> {
        self.element(value)
    }

    fn end(self) -> Result<(), FlattenError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for Compound<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FlattenError> {
        self.element(value)
    }

    fn end(self) -> Result<(), FlattenError> {
        Ok(())
    }
}

impl ser::SerializeStruct for Compound<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), FlattenError> {
        self.child(key, value)
    }

    fn end(self) -> Result<(), FlattenError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for Compound<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), FlattenError> {
        self.child(key, value)
    }

    fn end(self) -> Result<(), FlattenError> {
        Ok(())
    }
}

struct MapCompound<'a> {
    out: &'a mut FlattenedState,
    path: String,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapCompound<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), FlattenError> {
        let key = key
            .serialize(MapKeySerializer)
            .map_err(|e| e.or_path(&self.path))?;
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FlattenError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| FlattenError::at(&self.path, "map value without a key"))?;
        let path = join(&self.path, &key);
        value
            .serialize(LeafSerializer {
                out: &mut *self.out,
                path: path.clone(),
            })
            .map_err(|e| e.or_path(&path))
    }

    fn end(self) -> Result<(), FlattenError> {
        Ok(())
    }
}

/// Turns map keys into path segments.
struct MapKeySerializer;

fn key_must_be_string(found: &str) -> FlattenError {
    FlattenError::key(format!("map key must be a string, found {}", found))
}

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = FlattenError;

    type SerializeSeq = Impossible<String, FlattenError>;
    type SerializeTuple = Impossible<String, FlattenError>;
    type SerializeTupleStruct = Impossible<String, FlattenError>;
    type SerializeTupleVariant = Impossible<String, FlattenError>;
    type SerializeMap = Impossible<String, FlattenError>;
    type SerializeStruct = Impossible<String, FlattenError>;
    type SerializeStructVariant = Impossible<String, FlattenError>;

    fn serialize_bool(self, v: bool) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> Result<String, FlattenError> {
        Err(key_must_be_string("float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<String, FlattenError> {
        Err(key_must_be_string("float"))
    }

    fn serialize_char(self, v: char) -> Result<String, FlattenError> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String, FlattenError> {
        Ok(v.to_owned())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, FlattenError> {
        Err(key_must_be_string("bytes"))
    }

    fn serialize_none(self) -> Result<String, FlattenError> {
        Err(key_must_be_string("none"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<String, FlattenError> {
        Err(key_must_be_string("option"))
    }

    fn serialize_unit(self) -> Result<String, FlattenError> {
        Err(key_must_be_string("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, FlattenError> {
        Err(key_must_be_string("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, FlattenError> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, FlattenError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, FlattenError> {
        Err(key_must_be_string("enum variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, FlattenError> {
        Err(key_must_be_string("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, FlattenError> {
        Err(key_must_be_string("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, FlattenError> {
        Err(key_must_be_string("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, FlattenError> {
        Err(key_must_be_string("enum variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, FlattenError> {
        Err(key_must_be_string("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, FlattenError> {
        Err(key_must_be_string("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, FlattenError> {
        Err(key_must_be_string("enum variant"))
    }
}
