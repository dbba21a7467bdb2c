//! Integration tests for uiviz.
//!
//! These tests exercise the library and the `uiviz` binary against temporary
//! state directories. Desktop effects go through the stub controller, so
//! nothing on screen changes.
//!
//! ## Running Integration Tests
//!
//! ```bash
//! cargo nextest run -p uiviz --test integration
//!
//! # Run a specific test module
//! cargo nextest run -p uiviz --test integration -E 'test(/state__lock/)'
//! ```
//!
//! ## Test Organization
//!
//! Tests follow the naming convention `<module>__<test_name>` to allow filtering by module:
//! - `state__*` - State files and locks
//! - `dispatch__*` - User commands
//! - `daemon__*` - Reconciliation daemon

// Allow double-underscore naming for test modules (e.g., state__lock)
#![allow(non_snake_case)]
// Relax clippy lints for integration tests - these are test utilities, not production code
#![allow(
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::wildcard_imports
)]

mod common;

mod daemon__lifecycle;
mod daemon__signals;
mod dispatch__commands;
mod state__lock;
mod state__store;
