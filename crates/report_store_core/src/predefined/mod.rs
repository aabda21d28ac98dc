//! Code-defined, read-only report templates.
//!
//! # Responsibility
//! - Map report names to templates that build a fresh layout per call.
//! - Ship the built-in template set.
//!
//! # Invariants
//! - A catalog is immutable once shared; templates are never persisted.
//! - Every `produce` call returns an independent layout.

pub mod builtin;
pub mod catalog;
