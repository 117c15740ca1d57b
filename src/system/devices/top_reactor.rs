//! Single-Register Reactor Model.
//!
//! Models `TopReactorEx`: a reactor with one input port and two output ports.
//! On a start pulse it latches `in_data` and, after a short pipeline latency,
//! reacts with `out1 = in + 6` and `out2 = in + 4`. Outputs are only present
//! when the input was present.

use super::{Reactor, StartEdge};
use crate::common::RegValue;
use crate::soc::memory::SharedMemory;
use crate::soc::registers::RegisterMap;
use log::debug;

pub const TOP_SIGNATURE: RegValue = 0x7e5c_0001;

pub const SIGNATURE: u32 = 0;
pub const START: u32 = 1;
pub const DONE: u32 = 2;
pub const IN_PRESENT: u32 = 3;
pub const IN_DATA: u32 = 4;
pub const OUT1_PRESENT: u32 = 5;
pub const OUT1_DATA: u32 = 6;
pub const OUT2_PRESENT: u32 = 7;
pub const OUT2_DATA: u32 = 8;

/// Cycles between the start edge and `done`.
const LATENCY: u32 = 3;

pub struct TopReactor {
    regs: [RegValue; 9],
    start: StartEdge,
    countdown: u32,
}

impl TopReactor {
    pub fn new() -> Self {
        let mut regs = [0; 9];
        regs[SIGNATURE as usize] = TOP_SIGNATURE;
        Self {
            regs,
            start: StartEdge::default(),
            countdown: 0,
        }
    }

    pub fn register_map() -> RegisterMap {
        RegisterMap::new("TopReactorEx", TOP_SIGNATURE)
            .input("start", 1)
            .status("done", 1)
            .input("in_present", 1)
            .input("in_data", 32)
            .output("out1_present", 1)
            .output("out1_data", 32)
            .output("out2_present", 1)
            .output("out2_data", 32)
    }

    fn react(&mut self) {
        let present = self.regs[IN_PRESENT as usize] & 1;
        let input = self.regs[IN_DATA as usize];
        self.regs[OUT1_PRESENT as usize] = present;
        self.regs[OUT2_PRESENT as usize] = present;
        if present != 0 {
            self.regs[OUT1_DATA as usize] = input.wrapping_add(6);
            self.regs[OUT2_DATA as usize] = input.wrapping_add(4);
        }
        self.regs[DONE as usize] = 1;
        debug!("TopReactorEx reacted to input {}", input);
    }
}

impl Default for TopReactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reactor for TopReactor {
    fn name(&self) -> &str {
        "TopReactorEx"
    }

    fn register_map(&self) -> RegisterMap {
        Self::register_map()
    }

    fn read_reg(&mut self, index: u32) -> RegValue {
        self.regs.get(index as usize).copied().unwrap_or(0)
    }

    fn write_reg(&mut self, index: u32, value: RegValue) {
        match index {
            START => {
                self.regs[START as usize] = value & 1;
                if self.start.observe(value) {
                    self.regs[DONE as usize] = 0;
                    self.countdown = LATENCY;
                }
            }
            IN_PRESENT => self.regs[IN_PRESENT as usize] = value & 1,
            IN_DATA => self.regs[IN_DATA as usize] = value,
            _ => {}
        }
    }

    fn tick(&mut self, _mem: &mut SharedMemory) {
        if self.countdown > 0 {
            self.countdown -= 1;
            if self.countdown == 0 {
                self.react();
            }
        }
    }
}
