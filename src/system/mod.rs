//! Simulated Accelerator Hardware.
//!
//! Behavioural models of the register-mapped reactors that the host software
//! drives. They stand in for the synthesized hardware on the simulated
//! platform and honour the same control contract: edge-triggered start,
//! `done` status, and DMA access to shared memory.

pub mod devices;

pub use devices::{Reactor, ReactorKind};
