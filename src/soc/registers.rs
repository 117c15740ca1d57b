//! Register Map and Register Port.
//!
//! This module describes the register interface of one accelerator instance
//! and provides typed, name-based access to it over a raw
//! [`RegisterTransport`]. Register indices are assigned in declaration order,
//! with the read-only `signature` register always at index 0.

use crate::common::{Direction, Error, RegValue, RegisterKind, Result, WideAddress, REG_WIDTH};
use crate::soc::traits::RegisterTransport;
use log::trace;
use std::collections::HashMap;

/// Name of the identification register present in every map.
pub const SIGNATURE: &str = "signature";

/// A named, fixed-width, directional register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    name: String,
    index: u32,
    width: u32,
    kind: RegisterKind,
}

impl Register {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the register on the transport.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Width of the register in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn kind(&self) -> RegisterKind {
        self.kind
    }

    pub fn direction(&self) -> Direction {
        self.kind.direction()
    }

    /// Returns `true` if `value` is representable in this register.
    pub fn fits(&self, value: u64) -> bool {
        self.width >= 64 || value >> self.width == 0
    }
}

/// A 64-bit logical register made of a `{lo, hi}` register pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WideRegister {
    name: String,
    lo: u32,
    hi: u32,
}

impl WideRegister {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indices of the low and high halves.
    pub fn indices(&self) -> (u32, u32) {
        (self.lo, self.hi)
    }
}

/// Register interface of one accelerator.
///
/// Built with a small chained API:
///
/// ```ignore
/// let map = RegisterMap::new("TopReactorEx", 0x7e5c_0001)
///     .input("start", 1)
///     .status("done", 1)
///     .input("in_data", 32)
///     .output("out1_data", 32);
/// ```
#[derive(Clone, Debug)]
pub struct RegisterMap {
    name: String,
    signature: RegValue,
    registers: Vec<Register>,
    by_name: HashMap<String, usize>,
    wide: HashMap<String, WideRegister>,
}

impl RegisterMap {
    /// Creates a map containing only the `signature` status register.
    pub fn new(name: &str, signature: RegValue) -> Self {
        let map = Self {
            name: name.to_string(),
            signature,
            registers: Vec::new(),
            by_name: HashMap::new(),
            wide: HashMap::new(),
        };
        map.with(SIGNATURE, REG_WIDTH, RegisterKind::Status)
    }

    /// Appends an input (host-written) register.
    pub fn input(self, name: &str, width: u32) -> Self {
        self.with(name, width, RegisterKind::Input)
    }

    /// Appends a result register, valid only after completion.
    pub fn output(self, name: &str, width: u32) -> Self {
        self.with(name, width, RegisterKind::Output)
    }

    /// Appends a status register, valid in every state.
    pub fn status(self, name: &str, width: u32) -> Self {
        self.with(name, width, RegisterKind::Status)
    }

    /// Appends a host-written wide address as `<name>_lo` and `<name>_hi`.
    pub fn wide_input(self, name: &str) -> Self {
        let lo_name = format!("{}_lo", name);
        let hi_name = format!("{}_hi", name);
        let mut map = self
            .with(&lo_name, REG_WIDTH, RegisterKind::Input)
            .with(&hi_name, REG_WIDTH, RegisterKind::Input);
        let lo = map.registers[map.by_name[&lo_name]].index;
        let hi = map.registers[map.by_name[&hi_name]].index;
        map.wide.insert(
            name.to_string(),
            WideRegister {
                name: name.to_string(),
                lo,
                hi,
            },
        );
        map
    }

    fn with(mut self, name: &str, width: u32, kind: RegisterKind) -> Self {
        debug_assert!(width > 0 && width <= REG_WIDTH);
        debug_assert!(!self.by_name.contains_key(name), "duplicate register {}", name);
        let index = self.registers.len() as u32;
        self.by_name.insert(name.to_string(), self.registers.len());
        self.registers.push(Register {
            name: name.to_string(),
            index,
            width,
            kind,
        });
        self
    }

    /// Returns the accelerator name the map describes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value the `signature` register is expected to hold.
    pub fn signature(&self) -> RegValue {
        self.signature
    }

    pub fn get(&self, name: &str) -> Result<&Register> {
        self.by_name
            .get(name)
            .map(|&i| &self.registers[i])
            .ok_or_else(|| Error::UnknownRegister(name.to_string()))
    }

    pub fn wide(&self, name: &str) -> Result<&WideRegister> {
        self.wide
            .get(name)
            .ok_or_else(|| Error::UnknownRegister(name.to_string()))
    }

    /// Looks up the transport index of a register.
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).map(|&i| self.registers[i].index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Register> {
        self.registers.iter()
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}

/// Name-based register access to one accelerator over a transport.
///
/// Reads are never cached. Neither reads nor writes are retried; a transport
/// failure is returned to the caller with the register name attached.
pub struct RegisterPort<T: RegisterTransport> {
    transport: T,
    map: RegisterMap,
}

impl<T: RegisterTransport> RegisterPort<T> {
    pub fn new(transport: T, map: RegisterMap) -> Self {
        Self { transport, map }
    }

    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the port and returns the underlying transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Writes `value` to the named input register.
    ///
    /// # Errors
    ///
    /// * `UnknownRegister` if the map has no such register
    /// * `ReadOnlyRegister` if it is an output or status register
    /// * `ValueTooWide` if `value` does not fit the register width
    /// * `Transport` if the channel fails
    pub fn write(&mut self, name: &str, value: RegValue) -> Result<()> {
        let reg = self.map.get(name)?;
        if reg.direction() != Direction::Input {
            return Err(Error::ReadOnlyRegister(name.to_string()));
        }
        if !reg.fits(value as u64) {
            return Err(Error::ValueTooWide {
                register: name.to_string(),
                value: value as u64,
                width: reg.width,
            });
        }
        let index = reg.index;
        trace!("write {} (#{}) <- {:#x}", name, index, value);
        self.transport
            .write_reg(index, value)
            .map_err(|e| attach_name(e, name))
    }

    /// Reads the live value of the named register.
    pub fn read(&mut self, name: &str) -> Result<RegValue> {
        let index = self.map.get(name)?.index;
        let value = self
            .transport
            .read_reg(index)
            .map_err(|e| attach_name(e, name))?;
        trace!("read {} (#{}) -> {:#x}", name, index, value);
        Ok(value)
    }

    /// Writes a wide address to a register pair, low half first.
    pub fn write_wide(&mut self, name: &str, addr: WideAddress) -> Result<()> {
        let (lo, hi) = self.map.wide(name)?.indices();
        self.transport
            .write_reg(lo, addr.lo())
            .and_then(|_| self.transport.write_reg(hi, addr.hi()))
            .map_err(|e| attach_name(e, name))
    }

    /// Reads a wide address back from a register pair.
    pub fn read_wide(&mut self, name: &str) -> Result<WideAddress> {
        let (lo, hi) = self.map.wide(name)?.indices();
        let lo_val = self
            .transport
            .read_reg(lo)
            .map_err(|e| attach_name(e, name))?;
        let hi_val = self
            .transport
            .read_reg(hi)
            .map_err(|e| attach_name(e, name))?;
        Ok(WideAddress::from_parts(lo_val, hi_val))
    }
}

/// Replaces the transport-level register identifier with the register name.
fn attach_name(err: Error, name: &str) -> Error {
    match err {
        Error::Transport { reason, .. } => Error::Transport {
            register: name.to_string(),
            reason,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> RegisterMap {
        RegisterMap::new("Test", 0xABCD)
            .input("start", 1)
            .status("done", 1)
            .wide_input("baseAddr")
            .output("result", 16)
    }

    #[test]
    fn indices_follow_declaration_order() {
        let map = map();
        assert_eq!(map.index_of(SIGNATURE), Some(0));
        assert_eq!(map.index_of("start"), Some(1));
        assert_eq!(map.index_of("done"), Some(2));
        assert_eq!(map.wide("baseAddr").unwrap().indices(), (3, 4));
        assert_eq!(map.index_of("result"), Some(5));
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn register_width_check() {
        let map = map();
        let start = map.get("start").unwrap();
        assert!(start.fits(1));
        assert!(!start.fits(2));
        assert!(map.get(SIGNATURE).unwrap().fits(u32::MAX as u64));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let map = map();
        assert!(matches!(map.get("nope"), Err(Error::UnknownRegister(_))));
        assert!(matches!(map.wide("start"), Err(Error::UnknownRegister(_))));
    }
}
