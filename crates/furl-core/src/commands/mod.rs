//! High-level commands for furl operations.
//!
//! This module provides the public API frontends call into.

pub mod dismiss;

pub use dismiss::{DismissCommand, DismissReport, DismissRequest, dismiss_error};
