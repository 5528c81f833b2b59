//! Pass 1: lex, parse, include expansion, cycle detection and merge.
//!
//! Includes are expanded depth-first in directive order. An included file's
//! declarations and root keys are merged before the including file's own,
//! so the merged document reads as if every include had been pasted above
//! the file that names it.

use crate::ast::{Decl, Document, Entry, ObjectNode};
use crate::error::{IncludeError, RecError, Span};
use crate::lexer;
use crate::parser;
use crate::source::{normalize_path, FileSystemProvider, SourceProvider};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A document with every `#include` expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDocument {
    /// The root file the document was loaded from.
    pub path: PathBuf,
    /// Every file that contributed content, in merge order (root last).
    pub files: Vec<PathBuf>,
    /// All `@enum`/`@type` declarations, in merge order.
    pub decls: Vec<Decl>,
    /// The merged root object.
    pub root: ObjectNode,
}

/// Lex and parse a single file without touching its includes.
pub fn parse_source(src: &str, path: &Path) -> Result<Document, RecError> {
    let filename = path.display().to_string();
    let tokens = lexer::tokenize(src, &filename)?;
    parser::parse(&tokens, &filename)
}

/// Read, parse and resolve the root file at `path` from the filesystem.
pub fn load_document(path: &Path) -> Result<MergedDocument, RecError> {
    load_document_with_provider(path, &FileSystemProvider)
}

/// Read, parse and resolve the root file at `path` through `provider`.
pub fn load_document_with_provider(
    path: &Path,
    provider: &dyn SourceProvider,
) -> Result<MergedDocument, RecError> {
    let src = provider.read_source(path).map_err(|e| {
        RecError::new(
            IncludeError::FileNotFound {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
            Span::file_start(path.display().to_string()),
        )
    })?;
    parse_and_resolve_with_provider(&src, path, provider)
}

/// Parse `src` (the contents of `path`) and expand its includes from the
/// filesystem.
pub fn parse_and_resolve(src: &str, path: &Path) -> Result<MergedDocument, RecError> {
    parse_and_resolve_with_provider(src, path, &FileSystemProvider)
}

pub fn parse_and_resolve_with_provider(
    src: &str,
    path: &Path,
    provider: &dyn SourceProvider,
) -> Result<MergedDocument, RecError> {
    tracing::debug!(file = %path.display(), "parsing root document");
    let doc = parse_source(src, path)?;
    let merged = resolve(doc, path, &[], provider)?;
    tracing::debug!(
        file = %path.display(),
        files = merged.files.len(),
        decls = merged.decls.len(),
        keys = merged.root.entries.len(),
        "document resolved"
    );
    Ok(merged)
}

/// Expand the includes of `document`, which was parsed from `path`.
///
/// `already_visited` is the chain of files currently being expanded above
/// this one. It is copied, extended and handed down, never shared, so
/// sibling branches may include the same file independently.
pub fn resolve(
    document: Document,
    path: &Path,
    already_visited: &[PathBuf],
    provider: &dyn SourceProvider,
) -> Result<MergedDocument, RecError> {
    let identity = file_identity(provider, path);
    let mut chain = already_visited.to_vec();
    if !chain.contains(&identity) {
        chain.push(identity.clone());
    }
    let base_dir = identity.parent().unwrap_or(Path::new(".")).to_owned();

    let mut merger = Merger::default();
    for include in &document.includes {
        let target = provider.resolve_include(&base_dir, &include.path);
        let not_found = |e: std::io::Error| {
            RecError::new(
                IncludeError::FileNotFound {
                    path: target.display().to_string(),
                    reason: e.to_string(),
                },
                include.span.clone(),
            )
        };
        let canon = provider.canonicalize(&target).map_err(not_found)?;

        if chain.contains(&canon) {
            let mut names: Vec<String> = chain.iter().map(|p| short_name(p)).collect();
            names.push(short_name(&canon));
            return Err(RecError::new(
                IncludeError::CircularInclude { chain: names },
                include.span.clone(),
            ));
        }

        let src = provider.read_source(&canon).map_err(not_found)?;
        tracing::debug!(
            from = %path.display(),
            include = %canon.display(),
            depth = chain.len(),
            "expanding include"
        );
        let child = parse_source(&src, &canon)?;
        merger.absorb(resolve(child, &canon, &chain, provider)?)?;
    }

    merger.add_decls(document.decls)?;
    merger.add_entries(document.root.entries)?;
    merger.files.push(identity);

    Ok(MergedDocument {
        path: path.to_owned(),
        files: merger.files,
        decls: merger.decls,
        root: ObjectNode {
            annotation: None,
            entries: merger.entries,
            span: document.root.span,
        },
    })
}

/// Canonical identity of `path`, falling back to a lexical normalization
/// when the provider does not know the file (e.g. an unsaved root buffer).
fn file_identity(provider: &dyn SourceProvider, path: &Path) -> PathBuf {
    provider
        .canonicalize(path)
        .unwrap_or_else(|_| normalize_path(path))
}

fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Accumulates declarations and root keys, rejecting collisions.
#[derive(Default)]
struct Merger {
    files: Vec<PathBuf>,
    decls: Vec<Decl>,
    decl_spans: HashMap<String, Span>,
    entries: IndexMap<String, Entry>,
}

impl Merger {
    fn absorb(&mut self, other: MergedDocument) -> Result<(), RecError> {
        self.files.extend(other.files);
        self.add_decls(other.decls)?;
        self.add_entries(other.root.entries)
    }

    fn add_decls(&mut self, decls: Vec<Decl>) -> Result<(), RecError> {
        for decl in decls {
            if let Some(first) = self.decl_spans.get(decl.name()) {
                return Err(RecError::new(
                    IncludeError::DuplicateDeclaration {
                        name: decl.name().to_owned(),
                        first: first.clone(),
                    },
                    decl.span().clone(),
                ));
            }
            self.decl_spans
                .insert(decl.name().to_owned(), decl.span().clone());
            self.decls.push(decl);
        }
        Ok(())
    }

    fn add_entries(&mut self, entries: IndexMap<String, Entry>) -> Result<(), RecError> {
        for (key, entry) in entries {
            if let Some(first) = self.entries.get(&key) {
                return Err(RecError::new(
                    IncludeError::DuplicateKey {
                        key,
                        first: first.key_span.clone(),
                    },
                    entry.key_span,
                ));
            }
            self.entries.insert(key, entry);
        }
        Ok(())
    }
}
