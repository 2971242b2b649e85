//! Core types and utilities for the odsrc provisioning toolkit.
//!
//! This crate provides the foundational types used throughout odsrc:
//! - Odoo version handling and the short form used by download URLs
//! - Error types with error codes and fix suggestions
//! - Progress events and the observer interface consumed by presentation layers

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
mod progress;
mod version;

pub use error::{Error, ErrorCode, Result};
pub use progress::{NullObserver, ProgressEvent, ProgressObserver, Stage};
pub use version::OdooVersion;
