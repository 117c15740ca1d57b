//! Platform Traits.
//!
//! This module defines the capabilities a host platform must provide to drive
//! an accelerator: raw register access by index, and management of buffers in
//! accelerator-visible memory. How registers and buffers are physically
//! reached (PCIe, AXI-lite, a simulated memory map) is up to the implementor.

use crate::common::{RegValue, Result};
use crate::soc::memory::BufferHandle;

/// Raw register channel to one accelerator instance.
///
/// Registers are addressed by their index in the accelerator's register map.
/// Implementations must not cache: every read reflects live accelerator state.
pub trait RegisterTransport {
    /// Reads the register at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::common::Error::Transport) if the
    /// channel to the accelerator is unavailable.
    fn read_reg(&mut self, index: u32) -> Result<RegValue>;

    /// Writes `value` to the register at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::common::Error::Transport) if the
    /// channel to the accelerator is unavailable.
    fn write_reg(&mut self, index: u32, value: RegValue) -> Result<()>;
}

/// Buffer management for memory that the accelerator can reach.
///
/// Every successful [`allocate`](Self::allocate) must be matched by exactly
/// one [`release`](Self::release); see
/// [`BufferScope`](crate::soc::memory::BufferScope) for a scoped helper.
pub trait AcceleratorMemory {
    /// Reserves `size` bytes of accelerator-visible memory.
    fn allocate(&mut self, size: usize) -> Result<BufferHandle>;

    /// Copies the first `size` bytes of `host` into the buffer behind `handle`.
    ///
    /// Blocks until the copy has completed.
    fn copy_to_accelerator(&mut self, host: &[u8], handle: &BufferHandle, size: usize)
        -> Result<()>;

    /// Copies `size` bytes from the buffer behind `handle` into `host`.
    ///
    /// Blocks until the copy has completed.
    fn copy_to_host(&mut self, handle: &BufferHandle, host: &mut [u8], size: usize) -> Result<()>;

    /// Returns the buffer to the pool.
    ///
    /// Releasing is not idempotent: a handle that was already released fails
    /// with [`Error::InvalidHandle`](crate::common::Error::InvalidHandle).
    fn release(&mut self, handle: BufferHandle) -> Result<()>;
}

/// A complete host platform: register channel plus accelerator memory.
pub trait Platform: RegisterTransport + AcceleratorMemory {
    /// Returns the user-friendly name of the platform.
    ///
    /// Used for logging purposes.
    fn name(&self) -> &str;
}
