#![allow(clippy::result_large_err)]
//! rec-core: compiler frontend for the `.rec` typed configuration language.
//!
//! Turns `.rec` source files into a validated [`TypedDocument`]: lexing,
//! parsing, include resolution, a declaration registry, and a type checker
//! with format validation for `url`, `socket` and `pubkey` values.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`elaborate()`] -- load, resolve and validate a root file
//! - [`parse_and_resolve()`] / [`validate()`] -- the two halves of the pipeline
//! - [`Registry`] -- declaration lookup (Pass 2 output)
//! - [`TypedDocument`], [`TypedValue`] -- validated values (Pass 3 output)
//! - [`RecError`] -- diagnostic type; [`ErrorKind`] holds the stage error
//! - [`render()`] -- print a validated document back to canonical source
//!
//! Individual pass entry functions are also re-exported for selective
//! pipeline execution.

pub mod ast;
pub mod elaborate;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pass1_include;
pub mod pass2_registry;
pub mod pass3_validate;
pub mod pass4_render;
pub mod source;
pub mod value;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Decl, Document, ObjectNode, TypeRef, ValueKind, ValueNode};
pub use error::{ErrorKind, IncludeError, LexError, ParseError, RecError, Span, ValidationError};
pub use pass1_include::MergedDocument;
pub use pass2_registry::Registry;
pub use pass3_validate::ValidateOptions;
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};
pub use value::{
    FromValue, PublicKey, TypedDocument, TypedObject, TypedPayload, TypedValue, TypedVariant,
};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use elaborate::{elaborate, elaborate_source, elaborate_with, parse_and_resolve, validate};
pub use pass1_include::{load_document, parse_source, resolve};
pub use pass3_validate::{validate_with_options, validate_with_registry};
pub use pass4_render::render;
