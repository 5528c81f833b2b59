//! Elaboration pipeline: `.rec` source -> validated `TypedDocument`.
//!
//! This is a thin orchestrator over the pass modules. Every entry point
//! reports failures as a list of diagnostics: lex, parse and include
//! errors stop the run (one entry), validation reports everything it finds.

use crate::error::RecError;
use crate::pass1_include::{self, MergedDocument};
use crate::pass2_registry::Registry;
use crate::pass3_validate::{self, ValidateOptions};
use crate::source::{FileSystemProvider, SourceProvider};
use crate::value::TypedDocument;
use std::path::Path;

/// Pass 1: parse `src` (the text of the file at `path`) and expand its
/// includes from the filesystem.
pub fn parse_and_resolve(src: &str, path: &Path) -> Result<MergedDocument, Vec<RecError>> {
    pass1_include::parse_and_resolve(src, path).map_err(|e| vec![e])
}

/// Passes 2 and 3 against a registry the caller already holds.
pub fn validate(doc: &MergedDocument, registry: &Registry<'_>) -> Result<TypedDocument, Vec<RecError>> {
    pass3_validate::validate_with_registry(doc, registry, &ValidateOptions::default())
}

/// Load, resolve and validate the root file at `path`.
pub fn elaborate(path: &Path) -> Result<TypedDocument, Vec<RecError>> {
    elaborate_with(path, &FileSystemProvider, &ValidateOptions::default())
}

pub fn elaborate_with(
    path: &Path,
    provider: &dyn SourceProvider,
    options: &ValidateOptions,
) -> Result<TypedDocument, Vec<RecError>> {
    // Pass 1: read, parse and merge the include graph
    let doc = pass1_include::load_document_with_provider(path, provider).map_err(|e| vec![e])?;

    // Pass 2: declaration registry
    let registry = Registry::build(&doc.decls).map_err(|e| vec![e])?;

    // Pass 3: type checking
    pass3_validate::validate_with_registry(&doc, &registry, options)
}

/// Like [`elaborate_with`], for source text that is already in memory.
pub fn elaborate_source(
    src: &str,
    path: &Path,
    provider: &dyn SourceProvider,
    options: &ValidateOptions,
) -> Result<TypedDocument, Vec<RecError>> {
    let doc = pass1_include::parse_and_resolve_with_provider(src, path, provider)
        .map_err(|e| vec![e])?;
    let registry = Registry::build(&doc.decls).map_err(|e| vec![e])?;
    pass3_validate::validate_with_registry(&doc, &registry, options)
}
