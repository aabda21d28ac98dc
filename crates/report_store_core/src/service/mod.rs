//! Store use-case services.
//!
//! # Responsibility
//! - Expose the operations the reporting framework calls.
//! - Keep framework callers decoupled from storage backends.

pub mod report_store;
