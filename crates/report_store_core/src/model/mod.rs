//! Report domain model.
//!
//! # Responsibility
//! - Define the in-process report layout object designers edit.
//! - Define persisted catalog records and listing projections.
//!
//! # Invariants
//! - A report is identified by its name across both catalogs.
//! - Layout bytes are opaque outside the layout codec.

pub mod layout;
pub mod record;
