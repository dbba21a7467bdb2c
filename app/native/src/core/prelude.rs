//! Common re-exports for convenience.
//!
//! # Usage
//!
//! ```ignore
//! use crate::core::prelude::*;
//! ```

pub use super::constants::{APP_NAME, APP_VERSION};
pub use super::error::{Error, Result};
pub use crate::state::{StateValue, Subsystem, ValueKind};
