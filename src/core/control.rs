//! Accelerator Control Protocol.
//!
//! Drives one accelerator through a single synchronous transaction:
//!
//! 1. **Idle**: the host writes operand registers and wide buffer addresses.
//! 2. **Start**: a start pulse (write 1, then 0) arms the accelerator on the
//!    falling edge and moves the protocol to **Running**.
//! 3. **Running**: the host busy-polls the `done` status register.
//! 4. **Done**: output registers and buffers may be read.
//!
//! Each instance supports exactly one transaction. A second start pulse is
//! rejected rather than re-arming the accelerator.

use crate::common::{Error, RegValue, RegisterKind, Result, WideAddress};
use crate::soc::memory::BufferHandle;
use crate::soc::registers::{RegisterMap, RegisterPort, SIGNATURE};
use crate::soc::traits::{AcceleratorMemory, Platform};
use log::{debug, info};
use std::fmt;
use std::time::{Duration, Instant};

/// Name of the edge-triggered start register.
pub const START: &str = "start";

/// Name of the completion status register.
pub const DONE: &str = "done";

/// Position of an accelerator in the control protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Running,
    Done,
}

impl ControlState {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlState::Idle => "idle",
            ControlState::Running => "running",
            ControlState::Done => "done",
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-side handle to one register-mapped accelerator.
pub struct Accelerator<P: Platform> {
    port: RegisterPort<P>,
    state: ControlState,
    polls: u64,
}

impl<P: Platform> Accelerator<P> {
    /// Attaches to the accelerator behind `platform`.
    ///
    /// Checks that the `signature` register holds the value the map expects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] if the signature does not match, and
    /// [`Error::Transport`] if it cannot be read.
    pub fn attach(platform: P, map: RegisterMap) -> Result<Self> {
        let expected = map.signature();
        let mut port = RegisterPort::new(platform, map);
        let signature = port.read(SIGNATURE)?;
        if signature != expected {
            return Err(Error::Initialization(format!(
                "{} signature mismatch on {}: expected {:#010x}, read {:#010x}",
                port.map().name(),
                port.transport().name(),
                expected,
                signature
            )));
        }

        info!(
            "attached {} (signature {:#010x}) via {}",
            port.map().name(),
            signature,
            port.transport().name()
        );
        Ok(Self {
            port,
            state: ControlState::Idle,
            polls: 0,
        })
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn map(&self) -> &RegisterMap {
        self.port.map()
    }

    pub fn platform(&self) -> &P {
        self.port.transport()
    }

    pub fn platform_mut(&mut self) -> &mut P {
        self.port.transport_mut()
    }

    /// Detaches from the accelerator and returns the platform.
    pub fn into_platform(self) -> P {
        self.port.into_inner()
    }

    /// Returns how many times `done` has been read.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Reads the accelerator signature.
    pub fn signature(&mut self) -> Result<RegValue> {
        self.port.read(SIGNATURE)
    }

    /// Writes an input register (`set_<name>`).
    ///
    /// The start register can only be driven through [`start`](Self::start).
    pub fn set(&mut self, name: &str, value: RegValue) -> Result<()> {
        if name == START {
            return Err(Error::InvalidState {
                operation: "write start outside a pulse",
                state: self.state.as_str(),
            });
        }
        self.port.write(name, value)
    }

    /// Writes a wide address to a `{lo, hi}` register pair (`set_<baseAddr>`).
    pub fn set_wide(&mut self, name: &str, addr: WideAddress) -> Result<()> {
        self.port.write_wide(name, addr)
    }

    /// Reads a wide address back from a register pair.
    pub fn get_wide(&mut self, name: &str) -> Result<WideAddress> {
        self.port.read_wide(name)
    }

    /// Reads a register (`get_<name>`).
    ///
    /// Result registers are only valid once completion has been observed;
    /// reading one earlier fails with [`Error::InvalidState`]. Input and
    /// status registers can be read in any state.
    pub fn get(&mut self, name: &str) -> Result<RegValue> {
        let kind = self.port.map().get(name)?.kind();
        if kind == RegisterKind::Output && self.state != ControlState::Done {
            return Err(Error::InvalidState {
                operation: "read an output register",
                state: self.state.as_str(),
            });
        }
        self.port.read(name)
    }

    /// Issues the start pulse: writes 1, then immediately 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the accelerator is idle.
    pub fn start(&mut self) -> Result<()> {
        if self.state != ControlState::Idle {
            return Err(Error::InvalidState {
                operation: "start",
                state: self.state.as_str(),
            });
        }
        self.port.write(START, 1)?;
        self.port.write(START, 0)?;
        self.state = ControlState::Running;
        debug!("{}: start pulse issued", self.port.map().name());
        Ok(())
    }

    /// Reads `done` once and records completion if it is set.
    pub fn is_done(&mut self) -> Result<bool> {
        match self.state {
            ControlState::Done => return Ok(true),
            ControlState::Idle => {
                return Err(Error::InvalidState {
                    operation: "poll for completion",
                    state: self.state.as_str(),
                })
            }
            ControlState::Running => {}
        }

        self.polls += 1;
        if self.port.read(DONE)? == 1 {
            self.state = ControlState::Done;
            debug!(
                "{}: done after {} polls",
                self.port.map().name(),
                self.polls
            );
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Busy-waits until the accelerator reports completion.
    ///
    /// Blocks indefinitely if `done` never becomes 1.
    pub fn wait_done(&mut self) -> Result<()> {
        while !self.is_done()? {
            std::hint::spin_loop();
        }
        Ok(())
    }

    /// Busy-waits for completion, giving up after `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if `done` is not observed in time.
    pub fn wait_done_timeout(&mut self, deadline: Duration) -> Result<()> {
        let begin = Instant::now();
        loop {
            if self.is_done()? {
                return Ok(());
            }
            let waited = begin.elapsed();
            if waited >= deadline {
                return Err(Error::Timeout {
                    register: DONE.to_string(),
                    waited,
                });
            }
            std::hint::spin_loop();
        }
    }

    /// Waits for completion, with an optional deadline.
    pub fn wait(&mut self, deadline: Option<Duration>) -> Result<()> {
        match deadline {
            Some(deadline) => self.wait_done_timeout(deadline),
            None => self.wait_done(),
        }
    }

    /// Starts the accelerator and waits for it to finish.
    pub fn run(&mut self, deadline: Option<Duration>) -> Result<()> {
        self.start()?;
        self.wait(deadline)
    }
}

impl<P: Platform> AcceleratorMemory for Accelerator<P> {
    fn allocate(&mut self, size: usize) -> Result<BufferHandle> {
        self.platform_mut().allocate(size)
    }

    fn copy_to_accelerator(
        &mut self,
        host: &[u8],
        handle: &BufferHandle,
        size: usize,
    ) -> Result<()> {
        self.platform_mut().copy_to_accelerator(host, handle, size)
    }

    /// Copies a buffer back to the host.
    ///
    /// While a transaction is running the accelerator may still be writing
    /// the buffer, so the copy is refused until completion is observed.
    fn copy_to_host(&mut self, handle: &BufferHandle, host: &mut [u8], size: usize) -> Result<()> {
        if self.state == ControlState::Running {
            return Err(Error::InvalidState {
                operation: "read a buffer",
                state: self.state.as_str(),
            });
        }
        self.platform_mut().copy_to_host(handle, host, size)
    }

    fn release(&mut self, handle: BufferHandle) -> Result<()> {
        self.platform_mut().release(handle)
    }
}
