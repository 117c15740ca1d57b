//! Host Platform.
//!
//! The capabilities a host needs to reach an accelerator (register transport
//! and accelerator memory), the typed register port built on top of them, and
//! the simulated platform used when no physical accelerator is attached.

/// Simulated platform construction.
pub mod builder;

/// Shared memory pool and buffer handles.
pub mod memory;

/// Register maps and the named register port.
pub mod registers;

/// Platform capability traits.
pub mod traits;

pub use builder::{init_platform, SimPlatform};
pub use memory::{BufferHandle, BufferScope, SharedMemory};
pub use registers::{Register, RegisterMap, RegisterPort, WideRegister};
pub use traits::{AcceleratorMemory, Platform, RegisterTransport};
