//! Objects checked against `@type` declarations.

use super::Checker;
use crate::ast::*;
use crate::error::{Span, ValidationError};
use crate::value::{TypedObject, TypedValue};
use indexmap::IndexMap;

impl<'r, 'a> Checker<'r, 'a> {
    /// `Name { ... }` in a position with no declared type.
    pub(super) fn annotated_object(&mut self, obj: &ObjectNode, name: &str) -> Option<TypedValue> {
        match self.registry.get(name) {
            Some(Decl::Type(decl)) => self.typed_object(obj, decl),
            Some(Decl::Enum(_)) => {
                self.report(
                    ValidationError::TypeMismatch {
                        expected: "a @type name".to_owned(),
                        actual: format!("@enum {}", name),
                    },
                    &obj.span,
                );
                None
            }
            None => {
                self.report(ValidationError::UnknownType(name.to_owned()), &obj.span);
                // Still surface errors nested inside.
                self.untyped_object(obj);
                None
            }
        }
    }

    pub(super) fn typed_object(&mut self, obj: &ObjectNode, decl: &TypeDecl) -> Option<TypedValue> {
        let owner = format!("type {}", decl.name);
        let fields = self.fields(&obj.entries, &decl.fields, &owner, &obj.span)?;
        Some(TypedValue::Object(TypedObject {
            type_name: obj.annotation.clone(),
            fields,
        }))
    }

    /// Shared by `@type` objects and struct variant payloads: required
    /// fields present, no undeclared keys, every value of its field's type.
    pub(super) fn fields(
        &mut self,
        entries: &IndexMap<String, Entry>,
        declared: &[FieldDecl],
        owner: &str,
        span: &Span,
    ) -> Option<IndexMap<String, TypedValue>> {
        let mut ok = true;
        for field in declared {
            if !field.optional && !entries.contains_key(&field.name) {
                self.report(
                    ValidationError::MissingRequiredField {
                        owner: owner.to_owned(),
                        field: field.name.clone(),
                    },
                    span,
                );
                ok = false;
            }
        }

        let mut out = IndexMap::with_capacity(entries.len());
        for (key, entry) in entries {
            let checked = match declared.iter().find(|f| f.name == *key) {
                Some(field) if field.optional && matches!(entry.value.kind, ValueKind::Null) => {
                    Some(TypedValue::Null)
                }
                Some(field) => self.check(&entry.value, &field.ty),
                None => {
                    self.report(
                        ValidationError::UnknownField {
                            owner: owner.to_owned(),
                            field: key.clone(),
                        },
                        &entry.key_span,
                    );
                    self.infer(&entry.value);
                    None
                }
            };
            match checked {
                Some(v) => {
                    out.insert(key.clone(), v);
                }
                None => ok = false,
            }
        }
        ok.then_some(out)
    }
}
