//! Signature-Only Reactor Model.
//!
//! Models `CodesignTopReactor`, whose only register is the build signature.
//! Used to check that a platform can reach an accelerator at all.

use super::Reactor;
use crate::common::RegValue;
use crate::soc::registers::RegisterMap;

pub const CODESIGN_SIGNATURE: RegValue = 0xc0de_5197;

pub struct SignatureReactor;

impl SignatureReactor {
    pub fn new() -> Self {
        Self
    }

    pub fn register_map() -> RegisterMap {
        RegisterMap::new("CodesignTopReactor", CODESIGN_SIGNATURE)
    }
}

impl Default for SignatureReactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reactor for SignatureReactor {
    fn name(&self) -> &str {
        "CodesignTopReactor"
    }

    fn register_map(&self) -> RegisterMap {
        Self::register_map()
    }

    fn read_reg(&mut self, index: u32) -> RegValue {
        if index == 0 {
            CODESIGN_SIGNATURE
        } else {
            0
        }
    }

    fn write_reg(&mut self, _index: u32, _value: RegValue) {}
}
