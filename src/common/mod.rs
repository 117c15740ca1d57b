//! Common types used throughout the reactor platform.
//!
//! This module provides the fundamental types for register values, wide
//! addresses, register directions, and error handling that are shared by the
//! host-side control protocol and the simulation clock driver.

/// Wide (multi-register) address type.
pub mod addr;

/// Register direction and classification.
pub mod data;

/// Crate-wide error type.
pub mod error;

pub use addr::WideAddress;
pub use data::{Direction, RegisterKind};
pub use error::{Error, Result};

/// Raw value carried by a single accelerator register.
pub type RegValue = u32;

/// Width in bits of one accelerator register.
pub const REG_WIDTH: u32 = RegValue::BITS;
