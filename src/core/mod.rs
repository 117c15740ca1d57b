//! Host-side accelerator control.
//!
//! Sequences register writes, the start pulse, completion polling and result
//! reads for one accelerator transaction.

/// Start/done handshake and register access gating.
pub mod control;

pub use control::{Accelerator, ControlState};
