//! Codify literal emitter: typed object graphs to Rust source literals.
//!
//! Values describe themselves through [`Literal`] as a closed [`Node`] tree;
//! the printer turns that tree into a struct-literal expression that rebuilds
//! an equal value when compiled. Record types are qualified with their bare
//! package token (`v1::Deployment`), which the alias resolver later rewrites.

#![forbid(unsafe_code)]

mod emit;
mod k8s;
mod literal;
mod node;
mod reparse;

pub use emit::{emit, emit_checked, fix_adjacent_closers, render, Codified, EmissionError};
pub use k8s::{APPS_V1_RECORDS, CORE_V1_RECORDS, META_V1_RECORDS, POLICY_V1BETA1_RECORDS};
pub use literal::Literal;
pub use node::{camel_case, Field, Node, Record, Scalar, Shape, TypeMeta, TypePath};
pub use reparse::parse_source;
