//! Register Classification.
//!
//! This module defines how a register may be accessed by the host. The
//! register port uses the direction to reject writes to read-only state, and
//! the control protocol uses the kind to decide which reads are only valid
//! after completion.

/// Direction of a register as seen from the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host writes, accelerator reads (`set_<name>`).
    Input,

    /// Accelerator writes, host reads (`get_<name>`).
    Output,
}

/// Role of a register in the control contract.
///
/// Used to distinguish operand and result registers from status registers
/// whose value is meaningful at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisterKind {
    /// Operand or control input, written by the host.
    ///
    /// Reads return the last written value.
    Input,

    /// Result output of a transaction.
    ///
    /// Only valid once the accelerator has signalled completion.
    Output,

    /// Status register such as `done`, `cycles` or `signature`.
    ///
    /// Read-only to the host and valid in every control state.
    Status,
}

impl RegisterKind {
    /// Returns the host-side direction of this register kind.
    pub fn direction(self) -> Direction {
        match self {
            RegisterKind::Input => Direction::Input,
            RegisterKind::Output | RegisterKind::Status => Direction::Output,
        }
    }
}
