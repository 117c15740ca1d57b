//! Simulated Platform Builder.
//!
//! This module defines `SimPlatform`, the in-process platform that stands in
//! for a physical register driver. It owns the shared memory pool and one
//! reactor model, routes register accesses to the model, and advances the
//! model's clock on every access so that a polling host observes progress.

use crate::common::{Error, RegValue, Result};
use crate::config::Config;
use crate::soc::memory::{BufferHandle, SharedMemory};
use crate::soc::traits::{AcceleratorMemory, Platform, RegisterTransport};
use crate::system::devices::{Reactor, ReactorKind};
use log::{debug, info};

/// Emulated host platform with one attached reactor.
pub struct SimPlatform {
    name: String,
    reactor: Box<dyn Reactor>,
    memory: SharedMemory,
    reg_count: u32,
    cycles_per_access: u64,
    cycles: u64,
}

impl SimPlatform {
    /// Creates a platform around an existing reactor model and memory pool.
    ///
    /// # Arguments
    ///
    /// * `reactor` - The accelerator model to attach
    /// * `memory` - Shared memory the reactor can reach
    /// * `cycles_per_access` - Clock cycles the reactor advances per register access
    pub fn new(reactor: Box<dyn Reactor>, memory: SharedMemory, cycles_per_access: u64) -> Self {
        let reg_count = reactor.register_map().len() as u32;
        let name = format!("sim:{}", reactor.name());
        Self {
            name,
            reactor,
            memory,
            reg_count,
            cycles_per_access,
            cycles: 0,
        }
    }

    /// Returns the shared memory pool.
    pub fn memory(&self) -> &SharedMemory {
        &self.memory
    }

    /// Returns the number of reactor clock cycles elapsed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Advances the attached reactor by `cycles_per_access` cycles.
    fn advance(&mut self) {
        for _ in 0..self.cycles_per_access {
            self.reactor.tick(&mut self.memory);
        }
        self.cycles += self.cycles_per_access;
    }

    fn check_index(&self, index: u32) -> Result<()> {
        if index < self.reg_count {
            Ok(())
        } else {
            Err(Error::Transport {
                register: format!("#{}", index),
                reason: format!("{} has no register at index {}", self.name, index),
            })
        }
    }
}

impl RegisterTransport for SimPlatform {
    fn read_reg(&mut self, index: u32) -> Result<RegValue> {
        self.check_index(index)?;
        self.advance();
        Ok(self.reactor.read_reg(index))
    }

    fn write_reg(&mut self, index: u32, value: RegValue) -> Result<()> {
        self.check_index(index)?;
        self.reactor.write_reg(index, value);
        self.advance();
        Ok(())
    }
}

impl AcceleratorMemory for SimPlatform {
    fn allocate(&mut self, size: usize) -> Result<BufferHandle> {
        self.memory.allocate(size)
    }

    fn copy_to_accelerator(
        &mut self,
        host: &[u8],
        handle: &BufferHandle,
        size: usize,
    ) -> Result<()> {
        self.memory.copy_to_accelerator(host, handle, size)
    }

    fn copy_to_host(&mut self, handle: &BufferHandle, host: &mut [u8], size: usize) -> Result<()> {
        self.memory.copy_to_host(handle, host, size)
    }

    fn release(&mut self, handle: BufferHandle) -> Result<()> {
        self.memory.release(handle)
    }
}

impl Platform for SimPlatform {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Brings up the simulated platform with a fresh reactor of the given kind.
///
/// # Errors
///
/// Returns [`Error::Initialization`] if the configuration cannot describe a
/// usable platform.
pub fn init_platform(config: &Config, kind: ReactorKind) -> Result<SimPlatform> {
    config
        .validate()
        .map_err(|e| Error::Initialization(e.to_string()))?;

    let base = config.platform.mem_base_val();
    let size = config.platform.mem_size_val();
    let memory = SharedMemory::new(base, size, config.platform.alignment);
    debug!(
        "shared memory: {:#010x} - {:#010x} ({} bytes)",
        base,
        base + size as u64,
        size
    );

    let platform = SimPlatform::new(kind.build(), memory, config.platform.cycles_per_access);
    info!("initialized platform {}", platform.name());
    Ok(platform)
}
