//! Severity-tagged diagnostic log shared by every stage of the refactoring
//! execution protocol.
//!
//! A [`Status`] collects [`StatusEntry`] values in insertion order. Its
//! aggregate [`Severity`] is always the maximum over its entries, so callers
//! can merge statuses from condition checking, change creation, and change
//! validation without losing any diagnostic.
//!
//! # Severity taxonomy
//!
//! - [`Severity::Ok`] and [`Severity::Warning`] permit the refactoring to
//!   proceed.
//! - [`Severity::Error`] blocks application.
//! - [`Severity::Fatal`] halts the pipeline immediately.
//!
//! # Example
//!
//! ```
//! use heddle_status::{Severity, Status};
//!
//! let mut status = Status::ok();
//! status.add_warning("field visibility increased");
//! assert!(status.is_ok());
//!
//! status.merge(Status::error("name collision"));
//! assert_eq!(status.severity(), Severity::Error);
//! assert!(!status.is_ok());
//! ```

mod entry;
mod severity;
mod status;

pub use entry::{ContextRef, StatusEntry};
pub use severity::Severity;
pub use status::Status;

#[cfg(test)]
mod tests;
