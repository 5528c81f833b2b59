//! Pass 2: declaration registry -- index every `@enum`/`@type` by name and
//! check that the type references inside declarations resolve.

use crate::ast::*;
use crate::error::{IncludeError, RecError, Span, ValidationError};
use std::collections::HashMap;

/// Read-only lookup table over the declarations of a merged document.
///
/// The registry borrows the declarations it indexes; the document keeps
/// ownership, and one registry can serve any number of validation runs.
#[derive(Debug, Clone)]
pub struct Registry<'a> {
    order: Vec<&'a Decl>,
    by_name: HashMap<&'a str, &'a Decl>,
}

impl<'a> Registry<'a> {
    /// Index `decls`. Names must be unique; include resolution already
    /// guarantees this for merged documents.
    pub fn build(decls: &'a [Decl]) -> Result<Registry<'a>, RecError> {
        let mut by_name: HashMap<&'a str, &'a Decl> = HashMap::new();
        for decl in decls {
            if let Some(first) = by_name.get(decl.name()) {
                return Err(RecError::new(
                    IncludeError::DuplicateDeclaration {
                        name: decl.name().to_owned(),
                        first: first.span().clone(),
                    },
                    decl.span().clone(),
                ));
            }
            by_name.insert(decl.name(), decl);
        }
        tracing::debug!(decls = by_name.len(), "registry built");
        Ok(Registry {
            order: decls.iter().collect(),
            by_name,
        })
    }

    pub fn get(&self, name: &str) -> Option<&'a Decl> {
        self.by_name.get(name).copied()
    }

    pub fn get_enum(&self, name: &str) -> Option<&'a EnumDecl> {
        match self.get(name) {
            Some(Decl::Enum(e)) => Some(e),
            _ => None,
        }
    }

    pub fn get_type(&self, name: &str) -> Option<&'a TypeDecl> {
        match self.get(name) {
            Some(Decl::Type(t)) => Some(t),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Declarations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Decl> + '_ {
        self.order.iter().copied()
    }

    /// Report every named type reference in a declaration that the
    /// registry does not know. Each offending site is reported once, no
    /// matter how many values later flow through it.
    pub fn check_type_refs(&self) -> Vec<RecError> {
        let mut errors = Vec::new();
        for decl in &self.order {
            match decl {
                Decl::Type(t) => self.check_fields(&t.fields, &mut errors),
                Decl::Enum(e) => {
                    for v in &e.variants {
                        match &v.shape {
                            VariantShape::Unit => {}
                            VariantShape::Tuple(slots) => {
                                for slot in slots {
                                    self.check_ref(&slot.ty, &slot.span, &mut errors);
                                }
                            }
                            VariantShape::Struct(fields) => self.check_fields(fields, &mut errors),
                        }
                    }
                }
            }
        }
        errors
    }

    fn check_fields(&self, fields: &[FieldDecl], errors: &mut Vec<RecError>) {
        for f in fields {
            self.check_ref(&f.ty, &f.span, errors);
        }
    }

    fn check_ref(&self, ty: &TypeRef, span: &Span, errors: &mut Vec<RecError>) {
        for name in ty.named_refs() {
            if !self.contains(name) {
                errors.push(RecError::new(
                    ValidationError::UnknownType(name.to_owned()),
                    span.clone(),
                ));
            }
        }
    }
}
