//! Shared test utilities for folio integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring a pipeline to in-process vendors
//! - Builders for profiles, requests and templates

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;
