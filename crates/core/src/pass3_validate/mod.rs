//! Pass 3: type checking -- walk the merged value tree against the
//! registry, collecting every defect instead of stopping at the first.

mod object;
pub mod primitives;
mod variant;

use crate::ast::*;
use crate::error::{RecError, Span, ValidationError};
use crate::pass1_include::MergedDocument;
use crate::pass2_registry::Registry;
use crate::value::{TypedDocument, TypedObject, TypedValue};
use serde::Deserialize;

/// Knobs for a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidateOptions {
    /// Require pubkeys to be valid ed25519 curve points, not just 32 bytes.
    pub strict_pubkey: bool,
}

pub fn validate(doc: &MergedDocument) -> Result<TypedDocument, Vec<RecError>> {
    validate_with_options(doc, &ValidateOptions::default())
}

pub fn validate_with_options(
    doc: &MergedDocument,
    options: &ValidateOptions,
) -> Result<TypedDocument, Vec<RecError>> {
    let registry = Registry::build(&doc.decls).map_err(|e| vec![e])?;
    validate_with_registry(doc, &registry, options)
}

/// Validate against a prebuilt registry. Every error found is returned.
pub fn validate_with_registry(
    doc: &MergedDocument,
    registry: &Registry<'_>,
    options: &ValidateOptions,
) -> Result<TypedDocument, Vec<RecError>> {
    let mut checker = Checker {
        registry,
        options,
        errors: registry.check_type_refs(),
    };
    let root = checker.untyped_object(&doc.root);
    tracing::debug!(
        path = %doc.path.display(),
        errors = checker.errors.len(),
        "validation finished"
    );
    match root {
        Some(root) if checker.errors.is_empty() => Ok(TypedDocument { root }),
        _ => Err(checker.errors),
    }
}

/// Every check returns `None` once it (or anything below it) has reported
/// an error; siblings are still checked.
pub(super) struct Checker<'r, 'a> {
    pub(super) registry: &'r Registry<'a>,
    pub(super) options: &'r ValidateOptions,
    pub(super) errors: Vec<RecError>,
}

impl<'r, 'a> Checker<'r, 'a> {
    pub(super) fn report(&mut self, err: ValidationError, span: &Span) {
        self.errors.push(RecError::new(err, span.clone()));
    }

    pub(super) fn mismatch(&mut self, expected: impl ToString, node: &ValueNode) {
        self.report(
            ValidationError::TypeMismatch {
                expected: expected.to_string(),
                actual: node.kind.describe(),
            },
            &node.span,
        );
    }

    // ── Inferred ─────────────────────────────────────────────────────────────

    /// Check a value with no declared type. Annotations, enum literals and
    /// extended literals still carry their own type.
    pub(super) fn infer(&mut self, node: &ValueNode) -> Option<TypedValue> {
        match &node.kind {
            ValueKind::String(s) => Some(TypedValue::String(s.clone())),
            ValueKind::Int(n) => Some(TypedValue::Int(*n)),
            ValueKind::Float(f) => Some(TypedValue::Float(*f)),
            ValueKind::Bool(b) => Some(TypedValue::Bool(*b)),
            ValueKind::Null => Some(TypedValue::Null),
            ValueKind::Array(items) => self.untyped_array(items),
            ValueKind::Object(obj) => match &obj.annotation {
                Some(name) => self.annotated_object(obj, name),
                None => self.untyped_object(obj).map(TypedValue::Object),
            },
            ValueKind::Variant(lit) => self.variant(lit, &node.span),
            ValueKind::Extended { kind, raw } => self.extended(*kind, raw, &node.span),
        }
    }

    pub(super) fn untyped_object(&mut self, obj: &ObjectNode) -> Option<TypedObject> {
        let mut ok = true;
        let mut fields = indexmap::IndexMap::new();
        for (key, entry) in &obj.entries {
            match self.infer(&entry.value) {
                Some(v) => {
                    fields.insert(key.clone(), v);
                }
                None => ok = false,
            }
        }
        ok.then_some(TypedObject {
            type_name: None,
            fields,
        })
    }

    /// Untyped arrays must hold one kind of element. Ints and floats mix,
    /// nulls are ignored, and enum literals must share their enum.
    fn untyped_array(&mut self, items: &[ValueNode]) -> Option<TypedValue> {
        let mut ok = true;
        let mut out = Vec::with_capacity(items.len());
        let mut first: Option<String> = None;
        for item in items {
            let Some(value) = self.infer(item) else {
                ok = false;
                continue;
            };
            if let Some(kind) = element_kind(&value) {
                match &first {
                    None => first = Some(kind),
                    Some(expected) if *expected != kind => {
                        self.report(
                            ValidationError::TypeMismatch {
                                expected: format!("array element of kind {}", expected),
                                actual: kind,
                            },
                            &item.span,
                        );
                        ok = false;
                    }
                    Some(_) => {}
                }
            }
            out.push(value);
        }
        ok.then_some(TypedValue::Array(out))
    }

    // ── Declared ─────────────────────────────────────────────────────────────

    /// Check a value against a declared type.
    pub(super) fn check(&mut self, node: &ValueNode, ty: &TypeRef) -> Option<TypedValue> {
        if let Some(kind) = extended_kind(ty) {
            return match &node.kind {
                ValueKind::String(raw) => self.extended(kind, raw, &node.span),
                ValueKind::Extended { kind: found, raw } if *found == kind => {
                    self.extended(kind, raw, &node.span)
                }
                _ => {
                    self.mismatch(ty, node);
                    None
                }
            };
        }
        match (ty, &node.kind) {
            (TypeRef::String, ValueKind::String(s)) => Some(TypedValue::String(s.clone())),
            (TypeRef::Int, ValueKind::Int(n)) => Some(TypedValue::Int(*n)),
            (TypeRef::Float, ValueKind::Float(f)) => Some(TypedValue::Float(*f)),
            (TypeRef::Float, ValueKind::Int(n)) => Some(TypedValue::Float(*n as f64)),
            (TypeRef::Bool, ValueKind::Bool(b)) => Some(TypedValue::Bool(*b)),
            (TypeRef::Array(inner), ValueKind::Array(items)) => {
                let mut ok = true;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match self.check(item, inner) {
                        Some(v) => out.push(v),
                        None => ok = false,
                    }
                }
                ok.then_some(TypedValue::Array(out))
            }
            (TypeRef::Named(name), _) => self.check_named(node, name),
            _ => {
                self.mismatch(ty, node);
                None
            }
        }
    }

    fn check_named(&mut self, node: &ValueNode, name: &str) -> Option<TypedValue> {
        match (self.registry.get(name), &node.kind) {
            // Already reported at the declaration; fall back to inference.
            (None, _) => self.infer(node),
            (Some(Decl::Type(decl)), ValueKind::Object(obj)) => match &obj.annotation {
                Some(other) if other != name => {
                    self.mismatch(name, node);
                    self.untyped_object(obj);
                    None
                }
                _ => self.typed_object(obj, decl),
            },
            (Some(Decl::Enum(decl)), ValueKind::Variant(lit)) => {
                if lit.enum_name != name {
                    self.mismatch(name, node);
                    self.infer_payload(&lit.payload);
                    return None;
                }
                self.variant_of(lit, decl, &node.span)
            }
            _ => {
                self.mismatch(name, node);
                None
            }
        }
    }

    // ── Extended primitives ──────────────────────────────────────────────────

    fn extended(&mut self, kind: ExtendedKind, raw: &str, span: &Span) -> Option<TypedValue> {
        let parsed = match kind {
            ExtendedKind::Url => primitives::parse_url(raw).map(TypedValue::Url),
            ExtendedKind::Socket => primitives::parse_socket(raw).map(TypedValue::Socket),
            ExtendedKind::Pubkey => {
                primitives::parse_pubkey(raw, self.options.strict_pubkey).map(TypedValue::Pubkey)
            }
        };
        match parsed {
            Ok(v) => Some(v),
            Err(e) => {
                self.report(e, span);
                None
            }
        }
    }
}

fn extended_kind(ty: &TypeRef) -> Option<ExtendedKind> {
    match ty {
        TypeRef::Url => Some(ExtendedKind::Url),
        TypeRef::Socket => Some(ExtendedKind::Socket),
        TypeRef::Pubkey => Some(ExtendedKind::Pubkey),
        _ => None,
    }
}

/// Homogeneity class of an untyped array element; `None` for null.
fn element_kind(value: &TypedValue) -> Option<String> {
    match value {
        TypedValue::Null => None,
        TypedValue::Int(_) | TypedValue::Float(_) => Some("number".to_owned()),
        TypedValue::Variant(v) => Some(format!("enum {}", v.enum_name)),
        other => Some(other.kind_name().to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pass1_include::parse_and_resolve_with_provider;
    use crate::source::InMemoryProvider;
    use std::path::Path;

    pub(super) fn run(src: &str) -> Result<TypedDocument, Vec<RecError>> {
        run_with(src, &ValidateOptions::default())
    }

    pub(super) fn run_with(
        src: &str,
        options: &ValidateOptions,
    ) -> Result<TypedDocument, Vec<RecError>> {
        let provider = InMemoryProvider::default();
        let doc = parse_and_resolve_with_provider(src, Path::new("/t/main.rec"), &provider)
            .expect("test source should parse");
        validate_with_options(&doc, options)
    }

    /// The validation errors of a failing run, in report order.
    pub(super) fn errors(src: &str) -> Vec<ValidationError> {
        run(src)
            .expect_err("expected validation to fail")
            .into_iter()
            .map(|e| match e.kind {
                ErrorKind::Validation(v) => v,
                other => panic!("not a validation error: {:?}", other),
            })
            .collect()
    }

    #[test]
    fn untyped_root_accepts_any_shape() {
        let doc = run(r#"{ name: "svc" port: 80 ratio: 0.5 on: true gone: null nested: { a: [1, 2.5] } }"#)
            .unwrap();
        assert_eq!(doc.get("name").and_then(TypedValue::as_str), Some("svc"));
        assert_eq!(doc.get("port").and_then(TypedValue::as_int), Some(80));
        assert!(doc.get("gone").unwrap().is_null());
        assert_eq!(doc.root.type_name, None);
        let nested = doc.get("nested").unwrap().get("a").unwrap();
        assert_eq!(nested.as_array().map(<[_]>::len), Some(2));
    }

    #[test]
    fn extended_literals_self_describe() {
        let doc = run(
            r#"{ api: url("https://example.com") bind: socket("127.0.0.1:8080") key: pubkey("11111111111111111111111111111111") }"#,
        )
        .unwrap();
        assert!(matches!(doc.get("api"), Some(TypedValue::Url(u)) if u.host_str() == Some("example.com")));
        assert!(matches!(doc.get("bind"), Some(TypedValue::Socket(s)) if s.port() == 8080));
        assert!(matches!(doc.get("key"), Some(TypedValue::Pubkey(_))));
    }

    #[test]
    fn every_bad_extended_literal_is_reported() {
        let errs = errors(
            r#"{ a: socket("256.1.1.1:80") b: socket("127.0.0.1:70000") c: pubkey("not-base58!!") d: url("ftp://x") }"#,
        );
        assert_eq!(errs.len(), 4);
        assert!(matches!(errs[0], ValidationError::InvalidSocket { .. }));
        assert!(matches!(errs[1], ValidationError::InvalidSocket { .. }));
        assert!(matches!(errs[2], ValidationError::InvalidPubkey { .. }));
        assert!(matches!(errs[3], ValidationError::InvalidUrl { .. }));
    }

    #[test]
    fn strings_coerce_to_declared_extended_primitives() {
        let doc = run(
            r#"@type Net { api: url bind: socket key: pubkey }
{ net: Net { api: "http://h" bind: "10.0.0.1:22" key: "11111111111111111111111111111111" } }"#,
        )
        .unwrap();
        let net = doc.get("net").unwrap();
        assert!(matches!(net.get("api"), Some(TypedValue::Url(_))));
        assert!(matches!(net.get("bind"), Some(TypedValue::Socket(_))));
        assert!(matches!(net.get("key"), Some(TypedValue::Pubkey(_))));
    }

    #[test]
    fn wrong_extended_kind_is_a_mismatch() {
        let errs = errors(
            r#"@type Net { api: url }
{ net: Net { api: socket("1.2.3.4:5") } }"#,
        );
        assert_eq!(
            errs,
            vec![ValidationError::TypeMismatch {
                expected: "url".into(),
                actual: "socket".into()
            }]
        );
    }

    #[test]
    fn primitive_mismatch_names_both_kinds() {
        let errs = errors("@type S { port: int }\n{ s: S { port: \"80\" } }");
        assert_eq!(
            errs,
            vec![ValidationError::TypeMismatch {
                expected: "int".into(),
                actual: "string".into()
            }]
        );
    }

    #[test]
    fn int_widens_to_float() {
        let doc = run("@type S { r: float }\n{ s: S { r: 2 } }").unwrap();
        assert_eq!(doc.get("s").unwrap().get("r"), Some(&TypedValue::Float(2.0)));
    }

    #[test]
    fn typed_arrays_check_every_element() {
        let errs = errors("@type S { ports: [int] }\n{ s: S { ports: [1, \"two\", 3, false] } }");
        assert_eq!(errs.len(), 2);
        let doc = run("@type S { ports: [int] }\n{ s: S { ports: [] } }").unwrap();
        assert_eq!(
            doc.get("s").unwrap().get("ports"),
            Some(&TypedValue::Array(vec![]))
        );
    }

    #[test]
    fn untyped_arrays_are_homogeneous() {
        assert!(run("{ xs: [1, 2.5, null, 3] }").is_ok());
        assert!(run("{ xs: [{ a: 1 }, { b: \"x\" }] }").is_ok());
        let errs = errors("{ xs: [1, \"a\", true] }");
        assert_eq!(errs.len(), 2);
        assert_eq!(
            errs[0],
            ValidationError::TypeMismatch {
                expected: "array element of kind number".into(),
                actual: "string".into()
            }
        );
        let errs = errors("@enum A { X }\n@enum B { Y }\n{ xs: [A.X, B.Y] }");
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn unknown_field_type_reported_once_and_value_inferred() {
        let errs = errors(
            "@type S { a: Missing\n b: int }\n{ one: S { a: 1 b: 2 } two: S { a: \"x\" b: 3 } }",
        );
        assert_eq!(errs, vec![ValidationError::UnknownType("Missing".into())]);
    }

    #[test]
    fn errors_carry_value_spans() {
        let err = run("@type S { port: int }\n{\n  s: S {\n    port: \"80\"\n  }\n}")
            .unwrap_err()
            .remove(0);
        assert_eq!((err.span.line, err.span.column), (4, 11));
        assert_eq!(err.span.file, "/t/main.rec");
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: ValidateOptions = serde_json::from_str("{}").unwrap();
        assert!(!opts.strict_pubkey);
        let opts: ValidateOptions = serde_json::from_str(r#"{"strict_pubkey": true}"#).unwrap();
        assert!(opts.strict_pubkey);
    }

    #[test]
    fn strict_pubkey_rejects_off_curve_bytes() {
        // 0x02 followed by zeros has no square root on the curve.
        let mut bytes = [0u8; 32];
        bytes[0] = 2;
        let raw = bs58::encode(bytes).into_string();
        let src = format!("{{ k: pubkey(\"{}\") }}", raw);
        let strict = ValidateOptions {
            strict_pubkey: true,
        };
        let lenient = run_with(&src, &ValidateOptions::default());
        let strict = run_with(&src, &strict);
        assert!(lenient.is_ok());
        assert!(strict.is_err());
    }
}
