//! Enum-variant literals checked against `@enum` declarations.

use super::Checker;
use crate::ast::*;
use crate::error::{Span, ValidationError};
use crate::value::{TypedPayload, TypedValue, TypedVariant};

impl<'r, 'a> Checker<'r, 'a> {
    /// `Enum.Variant` in a position with no declared type.
    pub(super) fn variant(&mut self, lit: &VariantLiteral, span: &Span) -> Option<TypedValue> {
        match self.registry.get(&lit.enum_name) {
            Some(Decl::Enum(decl)) => self.variant_of(lit, decl, span),
            Some(Decl::Type(_)) => {
                self.report(
                    ValidationError::TypeMismatch {
                        expected: "an @enum name".to_owned(),
                        actual: format!("@type {}", lit.enum_name),
                    },
                    span,
                );
                self.infer_payload(&lit.payload);
                None
            }
            None => {
                self.report(ValidationError::UnknownType(lit.enum_name.clone()), span);
                self.infer_payload(&lit.payload);
                None
            }
        }
    }

    pub(super) fn variant_of(
        &mut self,
        lit: &VariantLiteral,
        decl: &EnumDecl,
        span: &Span,
    ) -> Option<TypedValue> {
        let Some(variant) = decl.variant(&lit.variant) else {
            self.report(
                ValidationError::UnknownVariant {
                    enum_name: decl.name.clone(),
                    variant: lit.variant.clone(),
                },
                span,
            );
            self.infer_payload(&lit.payload);
            return None;
        };
        let path = format!("{}.{}", decl.name, variant.name);

        let payload = match (&variant.shape, &lit.payload) {
            (VariantShape::Unit, PayloadNode::Unit) => TypedPayload::Unit,
            (VariantShape::Tuple(slots), PayloadNode::Tuple(items)) if slots.len() == items.len() => {
                let mut ok = true;
                let mut out = Vec::with_capacity(items.len());
                for (item, slot) in items.iter().zip(slots) {
                    match self.check(item, &slot.ty) {
                        Some(v) => out.push(v),
                        None => ok = false,
                    }
                }
                if !ok {
                    return None;
                }
                TypedPayload::Tuple(out)
            }
            (VariantShape::Struct(fields), PayloadNode::Struct(entries)) => {
                let owner = format!("variant {}", path);
                TypedPayload::Struct(self.fields(entries, fields, &owner, span)?)
            }
            (shape, payload) => {
                self.report(
                    ValidationError::VariantShapeMismatch {
                        variant: path,
                        expected: shape.describe(),
                        found: payload.describe(),
                    },
                    span,
                );
                self.infer_payload(&lit.payload);
                return None;
            }
        };

        Some(TypedValue::Variant(TypedVariant {
            enum_name: decl.name.clone(),
            variant: variant.name.clone(),
            payload,
        }))
    }

    /// Check a payload that has no usable declaration, so errors nested
    /// inside it are still reported.
    pub(super) fn infer_payload(&mut self, payload: &PayloadNode) {
        match payload {
            PayloadNode::Unit => {}
            PayloadNode::Tuple(items) => {
                for item in items {
                    self.infer(item);
                }
            }
            PayloadNode::Struct(entries) => {
                for entry in entries.values() {
                    self.infer(&entry.value);
                }
            }
        }
    }
}
