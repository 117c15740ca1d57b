//! Accelerator-Visible Memory.
//!
//! This module implements the shared-memory pool that backs accelerator
//! buffers on the simulated platform, the opaque handles through which the
//! host refers to those buffers, and a scope helper that guarantees every
//! allocation is released exactly once.

/// Opaque buffer handles and scoped acquisition.
pub mod buffer;

/// First-fit shared memory pool.
pub mod pool;

pub use buffer::{BufferHandle, BufferScope};
pub use pool::SharedMemory;
