//! AST types produced by the parser.
//!
//! Every node carries the [`Span`] of its first token. Nothing here is
//! resolved: type names and enum variants are plain strings until the
//! validator looks them up in the registry.

use crate::error::Span;
use indexmap::IndexMap;
use std::fmt;

// ──────────────────────────────────────────────
// Document
// ──────────────────────────────────────────────

/// One parsed `.rec` file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub includes: Vec<Include>,
    pub decls: Vec<Decl>,
    pub root: ObjectNode,
}

/// An `#include "path"` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub path: String,
    pub span: Span,
}

// ──────────────────────────────────────────────
// Declarations
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Enum(EnumDecl),
    Type(TypeDecl),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Enum(e) => &e.name,
            Decl::Type(t) => &t.name,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Decl::Enum(e) => &e.span,
            Decl::Type(t) => &t.span,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Decl::Enum(_) => "@enum",
            Decl::Type(_) => "@type",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub variants: Vec<VariantDecl>,
    pub span: Span,
}

impl EnumDecl {
    pub fn variant(&self, name: &str) -> Option<&VariantDecl> {
        self.variants.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantDecl {
    pub name: String,
    pub shape: VariantShape,
    pub span: Span,
}

/// Payload shape of an enum variant.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantShape {
    Unit,
    Tuple(Vec<TypeSlot>),
    Struct(Vec<FieldDecl>),
}

impl VariantShape {
    pub fn describe(&self) -> String {
        match self {
            VariantShape::Unit => "no payload".to_owned(),
            VariantShape::Tuple(items) => format!("a tuple of {}", items.len()),
            VariantShape::Struct(_) => "a struct payload".to_owned(),
        }
    }
}

/// A type reference appearing in a tuple variant, with its own location.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSlot {
    pub ty: TypeRef,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// `name: type` or `name?: type`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub optional: bool,
    pub span: Span,
}

/// A type as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    String,
    Int,
    Float,
    Bool,
    Url,
    Socket,
    Pubkey,
    /// Named reference to an `@enum` or `@type`, resolved at validation
    Named(String),
    Array(Box<TypeRef>),
}

impl TypeRef {
    /// Map a primitive keyword to its type, if it is one.
    pub fn primitive(word: &str) -> Option<TypeRef> {
        Some(match word {
            "string" => TypeRef::String,
            "int" => TypeRef::Int,
            "float" => TypeRef::Float,
            "bool" => TypeRef::Bool,
            "url" => TypeRef::Url,
            "socket" => TypeRef::Socket,
            "pubkey" => TypeRef::Pubkey,
            _ => return None,
        })
    }

    /// Every named reference inside this type, including array elements.
    pub fn named_refs(&self) -> Vec<&str> {
        match self {
            TypeRef::Named(n) => vec![n.as_str()],
            TypeRef::Array(inner) => inner.named_refs(),
            _ => vec![],
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::String => f.write_str("string"),
            TypeRef::Int => f.write_str("int"),
            TypeRef::Float => f.write_str("float"),
            TypeRef::Bool => f.write_str("bool"),
            TypeRef::Url => f.write_str("url"),
            TypeRef::Socket => f.write_str("socket"),
            TypeRef::Pubkey => f.write_str("pubkey"),
            TypeRef::Named(n) => f.write_str(n),
            TypeRef::Array(inner) => write!(f, "[{}]", inner),
        }
    }
}

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    pub kind: ValueKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Array(Vec<ValueNode>),
    Object(ObjectNode),
    Variant(VariantLiteral),
    Extended { kind: ExtendedKind, raw: String },
}

impl ValueKind {
    /// Short description of the literal's kind, used in type mismatch errors.
    pub fn describe(&self) -> String {
        match self {
            ValueKind::String(_) => "string".to_owned(),
            ValueKind::Int(_) => "int".to_owned(),
            ValueKind::Float(_) => "float".to_owned(),
            ValueKind::Bool(_) => "bool".to_owned(),
            ValueKind::Null => "null".to_owned(),
            ValueKind::Array(_) => "array".to_owned(),
            ValueKind::Object(obj) => match &obj.annotation {
                Some(name) => format!("object {}", name),
                None => "object".to_owned(),
            },
            ValueKind::Variant(v) => format!("enum literal {}.{}", v.enum_name, v.variant),
            ValueKind::Extended { kind, .. } => kind.keyword().to_owned(),
        }
    }
}

/// `{ key: value ... }`, optionally prefixed with a type name.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    pub annotation: Option<String>,
    pub entries: IndexMap<String, Entry>,
    pub span: Span,
}

/// One `key: value` pair; the key span points at the key.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key_span: Span,
    pub value: ValueNode,
}

/// `Enum.Variant`, `Enum.Variant(...)` or `Enum.Variant { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct VariantLiteral {
    pub enum_name: String,
    pub variant: String,
    pub payload: PayloadNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadNode {
    Unit,
    Tuple(Vec<ValueNode>),
    Struct(IndexMap<String, Entry>),
}

impl PayloadNode {
    pub fn describe(&self) -> String {
        match self {
            PayloadNode::Unit => "no payload".to_owned(),
            PayloadNode::Tuple(items) => format!("a tuple of {}", items.len()),
            PayloadNode::Struct(_) => "a struct payload".to_owned(),
        }
    }
}

/// The format-validated, string-backed primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtendedKind {
    Url,
    Socket,
    Pubkey,
}

impl ExtendedKind {
    pub fn from_keyword(word: &str) -> Option<ExtendedKind> {
        match word {
            "url" => Some(ExtendedKind::Url),
            "socket" => Some(ExtendedKind::Socket),
            "pubkey" => Some(ExtendedKind::Pubkey),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ExtendedKind::Url => "url",
            ExtendedKind::Socket => "socket",
            ExtendedKind::Pubkey => "pubkey",
        }
    }
}
