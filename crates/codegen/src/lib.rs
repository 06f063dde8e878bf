//! Codify codegen: alias resolution, lifecycle fragments and program assembly.
//!
//! Pipeline per object: sanitize -> emit literal -> resolve aliases -> install
//! and uninstall fragments. [`assemble`] stitches the fragments of a batch
//! into one program that links `codify-runtime`.

#![forbid(unsafe_code)]

mod adapter;
mod program;
mod resolve;

use codify_core::Kind;
use codify_literal::EmissionError;
use thiserror::Error;

pub use adapter::{generated_identifier, Fragment, FragmentNamer, KindAdapter};
pub use program::{assemble, cargo_toml, validate_app_name, Program, ProgramValues, RuntimeSource};
pub use resolve::{AliasResolver, ResolveError};

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("{key} ({kind}): {source}")]
    Emit { kind: Kind, key: String, source: EmissionError },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("build fragment: {0}")]
    Syntax(#[from] syn::Error),
    #[error("render Cargo.toml: {0}")]
    Manifest(#[from] toml::ser::Error),
    #[error("`{name}` is not a valid package name (ASCII letters, digits, `-`, `_`; no leading digit)")]
    AppName { name: String },
}
