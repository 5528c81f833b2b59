//! Typed value model: the output of a successful validation run.
//!
//! Extended primitives are held in their parsed form, and enum literals are
//! known to name a declared variant with a matching payload. This tree is
//! what downstream consumers read.

use crate::error::ValidationError;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::net::SocketAddrV4;
use url::Url;

/// A 32-byte ed25519 public key decoded from Base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub const LEN: usize = 32;

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        PublicKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base58())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Url(Url),
    Socket(SocketAddrV4),
    Pubkey(PublicKey),
    Array(Vec<TypedValue>),
    Object(TypedObject),
    Variant(TypedVariant),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedObject {
    /// The annotation written in source (`Name { ... }`), if any.
    pub type_name: Option<String>,
    pub fields: IndexMap<String, TypedValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedVariant {
    pub enum_name: String,
    pub variant: String,
    pub payload: TypedPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedPayload {
    Unit,
    Tuple(Vec<TypedValue>),
    Struct(IndexMap<String, TypedValue>),
}

/// A fully validated document.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedDocument {
    pub root: TypedObject,
}

impl TypedDocument {
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.root.fields.get(key)
    }
}

impl TypedValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypedValue::String(_) => "string",
            TypedValue::Int(_) => "int",
            TypedValue::Float(_) => "float",
            TypedValue::Bool(_) => "bool",
            TypedValue::Null => "null",
            TypedValue::Url(_) => "url",
            TypedValue::Socket(_) => "socket",
            TypedValue::Pubkey(_) => "pubkey",
            TypedValue::Array(_) => "array",
            TypedValue::Object(_) => "object",
            TypedValue::Variant(_) => "enum",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TypedValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            TypedValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&TypedObject> {
        match self {
            TypedValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_variant(&self) -> Option<&TypedVariant> {
        match self {
            TypedValue::Variant(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// Field lookup on objects and struct-variant payloads.
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        match self {
            TypedValue::Object(obj) => obj.fields.get(key),
            TypedValue::Variant(TypedVariant {
                payload: TypedPayload::Struct(fields),
                ..
            }) => fields.get(key),
            _ => None,
        }
    }
}

impl TypedVariant {
    /// `Enum.Variant`
    pub fn path(&self) -> String {
        format!("{}.{}", self.enum_name, self.variant)
    }
}

// ──────────────────────────────────────────────
// Serialization
// ──────────────────────────────────────────────

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypedValue::String(s) => serializer.serialize_str(s),
            TypedValue::Int(i) => serializer.serialize_i64(*i),
            TypedValue::Float(f) => serializer.serialize_f64(*f),
            TypedValue::Bool(b) => serializer.serialize_bool(*b),
            TypedValue::Null => serializer.serialize_none(),
            TypedValue::Url(u) => serializer.serialize_str(u.as_str()),
            TypedValue::Socket(s) => serializer.collect_str(s),
            TypedValue::Pubkey(p) => serializer.serialize_str(&p.to_base58()),
            TypedValue::Array(items) => items.serialize(serializer),
            TypedValue::Object(obj) => obj.serialize(serializer),
            TypedValue::Variant(v) => v.serialize(serializer),
        }
    }
}

/// Ordered field map shared by objects and struct payloads.
struct Fields<'a>(&'a IndexMap<String, TypedValue>);

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for TypedObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Fields(&self.fields).serialize(serializer)
    }
}

impl Serialize for TypedVariant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.payload {
            TypedPayload::Unit => serializer.serialize_str(&self.path()),
            TypedPayload::Tuple(items) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("variant", &self.path())?;
                map.serialize_entry("data", items)?;
                map.end()
            }
            TypedPayload::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("variant", &self.path())?;
                map.serialize_entry("data", &Fields(fields))?;
                map.end()
            }
        }
    }
}

impl Serialize for TypedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

// ──────────────────────────────────────────────
// Extraction into Rust types
// ──────────────────────────────────────────────

/// Conversion from a typed value into a plain Rust value.
pub trait FromValue: Sized {
    fn from_value(value: &TypedValue) -> Result<Self, ValidationError>;
}

fn mismatch(expected: &str, value: &TypedValue) -> ValidationError {
    ValidationError::TypeMismatch {
        expected: expected.to_owned(),
        actual: value.kind_name().to_owned(),
    }
}

macro_rules! from_value_impl {
    ($ty:ty, $name:literal, $pat:pat => $out:expr) => {
        impl FromValue for $ty {
            fn from_value(value: &TypedValue) -> Result<Self, ValidationError> {
                match value {
                    $pat => Ok($out),
                    other => Err(mismatch($name, other)),
                }
            }
        }
    };
}

from_value_impl!(String, "string", TypedValue::String(s) => s.clone());
from_value_impl!(i64, "int", TypedValue::Int(i) => *i);
from_value_impl!(bool, "bool", TypedValue::Bool(b) => *b);
from_value_impl!(Url, "url", TypedValue::Url(u) => u.clone());
from_value_impl!(SocketAddrV4, "socket", TypedValue::Socket(s) => *s);
from_value_impl!(PublicKey, "pubkey", TypedValue::Pubkey(p) => *p);

impl FromValue for f64 {
    fn from_value(value: &TypedValue) -> Result<Self, ValidationError> {
        match value {
            TypedValue::Float(f) => Ok(*f),
            TypedValue::Int(i) => Ok(*i as f64),
            other => Err(mismatch("float", other)),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &TypedValue) -> Result<Self, ValidationError> {
        match value {
            TypedValue::Array(items) => items.iter().map(T::from_value).collect(),
            other => Err(mismatch("array", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &TypedValue) -> Result<Self, ValidationError> {
        match value {
            TypedValue::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
