pub mod signature;
pub mod top_reactor;
pub mod vadd;

pub use signature::SignatureReactor;
pub use top_reactor::TopReactor;
pub use vadd::VaddReactor;

use crate::common::RegValue;
use crate::soc::memory::SharedMemory;
use crate::soc::registers::RegisterMap;

/// A register-mapped accelerator model.
pub trait Reactor {
    /// Returns the display name of the reactor for logging.
    fn name(&self) -> &str;

    /// Returns the register interface the reactor implements.
    fn register_map(&self) -> RegisterMap;

    /// Reads the register at `index`. Unmapped indices read as zero.
    fn read_reg(&mut self, index: u32) -> RegValue;

    /// Writes the register at `index`. Writes to read-only or unmapped
    /// indices are ignored, as on the hardware.
    fn write_reg(&mut self, index: u32, value: RegValue);

    /// Advances the reactor by one clock cycle.
    ///
    /// `mem` is the shared memory the reactor may access as a bus master.
    fn tick(&mut self, _mem: &mut SharedMemory) {}
}

/// The reactor models available on the simulated platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(clap::ValueEnum)]
pub enum ReactorKind {
    /// Single-register reactor (`TopReactorEx`).
    Top,
    /// Buffer-based pairwise adder (`VaddReactor`).
    Vadd,
    /// Signature-only reactor (`CodesignTopReactor`).
    Signature,
}

impl ReactorKind {
    /// Instantiates a fresh model of this kind.
    pub fn build(self) -> Box<dyn Reactor> {
        match self {
            ReactorKind::Top => Box::new(TopReactor::new()),
            ReactorKind::Vadd => Box::new(VaddReactor::new()),
            ReactorKind::Signature => Box::new(SignatureReactor::new()),
        }
    }

    /// Returns the register map of this kind without instantiating it.
    pub fn register_map(self) -> RegisterMap {
        match self {
            ReactorKind::Top => TopReactor::register_map(),
            ReactorKind::Vadd => VaddReactor::register_map(),
            ReactorKind::Signature => SignatureReactor::register_map(),
        }
    }
}

/// Falling-edge detector for the start register.
///
/// A transaction begins on the 1→0 transition of `start`; holding the
/// register at 1 does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct StartEdge {
    level: bool,
}

impl StartEdge {
    /// Records a new start level and returns `true` on a falling edge.
    pub fn observe(&mut self, value: RegValue) -> bool {
        let level = value & 1 != 0;
        let fell = self.level && !level;
        self.level = level;
        fell
    }

    /// Returns the currently held level.
    pub fn level(&self) -> bool {
        self.level
    }
}
