//! Wide Address Type.
//!
//! Accelerator registers are 32 bits wide, but buffer base addresses in
//! accelerator-visible memory are 64-bit values. A `WideAddress` is the
//! logical address that is split across an ordered `{lo, hi}` register pair.

use super::RegValue;
use std::fmt;

/// A 64-bit accelerator address carried by a pair of registers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WideAddress(u64);

impl WideAddress {
    /// Creates a wide address from its full 64-bit value.
    pub const fn new(val: u64) -> Self {
        Self(val)
    }

    /// Reassembles a wide address from its low and high register halves.
    pub const fn from_parts(lo: RegValue, hi: RegValue) -> Self {
        Self(((hi as u64) << 32) | lo as u64)
    }

    /// Returns the full 64-bit value.
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Returns the low register half.
    pub const fn lo(self) -> RegValue {
        self.0 as RegValue
    }

    /// Returns the high register half.
    pub const fn hi(self) -> RegValue {
        (self.0 >> 32) as RegValue
    }
}

impl fmt::Display for WideAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
