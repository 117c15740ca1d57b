//! Buffer-Based Pairwise Adder Model.
//!
//! Models `VaddReactor`. On a start pulse it reads `VADD_PAIRS` pairs of
//! little-endian 64-bit words starting at `baseAddr`, and writes the sum of
//! each pair to consecutive words starting at `baseAddrRes`. One pair is
//! processed per clock cycle; `cycles` counts the cycles the transaction took.

use super::{Reactor, StartEdge};
use crate::common::{RegValue, WideAddress};
use crate::soc::memory::SharedMemory;
use crate::soc::registers::RegisterMap;
use log::debug;

pub const VADD_SIGNATURE: RegValue = 0x7e5c_00ad;

/// Number of output words produced per transaction.
pub const VADD_PAIRS: usize = 5;

pub const SIGNATURE: u32 = 0;
pub const START: u32 = 1;
pub const DONE: u32 = 2;
pub const BASE_ADDR_LO: u32 = 3;
pub const BASE_ADDR_HI: u32 = 4;
pub const BASE_ADDR_RES_LO: u32 = 5;
pub const BASE_ADDR_RES_HI: u32 = 6;
pub const CYCLES: u32 = 7;

const WORD: u64 = 8;

/// An in-flight transaction.
#[derive(Clone, Copy, Debug)]
struct Job {
    src: u64,
    dst: u64,
    next: usize,
}

pub struct VaddReactor {
    regs: [RegValue; 8],
    start: StartEdge,
    job: Option<Job>,
}

impl VaddReactor {
    pub fn new() -> Self {
        let mut regs = [0; 8];
        regs[SIGNATURE as usize] = VADD_SIGNATURE;
        Self {
            regs,
            start: StartEdge::default(),
            job: None,
        }
    }

    pub fn register_map() -> RegisterMap {
        RegisterMap::new("VaddReactor", VADD_SIGNATURE)
            .input("start", 1)
            .status("done", 1)
            .wide_input("baseAddr")
            .wide_input("baseAddrRes")
            .status("cycles", 32)
    }

    fn wide(&self, lo: u32, hi: u32) -> u64 {
        WideAddress::from_parts(self.regs[lo as usize], self.regs[hi as usize]).val()
    }

    fn begin(&mut self) {
        let job = Job {
            src: self.wide(BASE_ADDR_LO, BASE_ADDR_HI),
            dst: self.wide(BASE_ADDR_RES_LO, BASE_ADDR_RES_HI),
            next: 0,
        };
        debug!(
            "VaddReactor start: src={:#x} dst={:#x}",
            job.src, job.dst
        );
        self.regs[DONE as usize] = 0;
        self.regs[CYCLES as usize] = 0;
        self.job = Some(job);
    }
}

impl Default for VaddReactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reactor for VaddReactor {
    fn name(&self) -> &str {
        "VaddReactor"
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
                    self.begin();
                }
            }
            BASE_ADDR_LO..=BASE_ADDR_RES_HI => self.regs[index as usize] = value,
            _ => {}
        }
    }

    fn tick(&mut self, mem: &mut SharedMemory) {
        let Some(mut job) = self.job else {
            return;
        };

        self.regs[CYCLES as usize] = self.regs[CYCLES as usize].wrapping_add(1);

        let i = job.next as u64;
        // Addresses wrap like a bus address counter; out-of-pool accesses are inert.
        let a = mem.read_u64(job.src.wrapping_add(2 * i * WORD));
        let b = mem.read_u64(job.src.wrapping_add((2 * i + 1) * WORD));
        mem.write_u64(job.dst.wrapping_add(i * WORD), a.wrapping_add(b));
        job.next += 1;

        if job.next == VADD_PAIRS {
            self.regs[DONE as usize] = 1;
            self.job = None;
            debug!(
                "VaddReactor done after {} cycles",
                self.regs[CYCLES as usize]
            );
        } else {
            self.job = Some(job);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soc::traits::AcceleratorMemory;

    #[test]
    fn map_matches_model_indices() {
        let map = VaddReactor::register_map();
        assert_eq!(map.index_of("start"), Some(START));
        assert_eq!(map.index_of("done"), Some(DONE));
        assert_eq!(map.wide("baseAddr").unwrap().indices(), (BASE_ADDR_LO, BASE_ADDR_HI));
        assert_eq!(
            map.wide("baseAddrRes").unwrap().indices(),
            (BASE_ADDR_RES_LO, BASE_ADDR_RES_HI)
        );
        assert_eq!(map.index_of("cycles"), Some(CYCLES));
    }

    #[test]
    fn sums_one_pair_per_cycle() {
        let mut mem = SharedMemory::new(0x4000, 1024, 64);
        let input = mem.allocate(80).unwrap();
        let output = mem.allocate(40).unwrap();
        let bytes: Vec<u8> = (0u64..10).flat_map(|v| v.to_le_bytes()).collect();
        mem.copy_to_accelerator(&bytes, &input, 80).unwrap();

        let mut dut = VaddReactor::new();
        dut.write_reg(BASE_ADDR_LO, input.address().lo());
        dut.write_reg(BASE_ADDR_HI, input.address().hi());
        dut.write_reg(BASE_ADDR_RES_LO, output.address().lo());
        dut.write_reg(BASE_ADDR_RES_HI, output.address().hi());
        dut.write_reg(START, 1);
        dut.write_reg(START, 0);

        for _ in 0..VADD_PAIRS {
            assert_eq!(dut.read_reg(DONE), 0);
            dut.tick(&mut mem);
        }
        assert_eq!(dut.read_reg(DONE), 1);
        assert_eq!(dut.read_reg(CYCLES), VADD_PAIRS as u32);

        let sums: Vec<u64> = (0..VADD_PAIRS as u64)
            .map(|i| mem.read_u64(output.address().val() + i * 8))
            .collect();
        assert_eq!(sums, vec![1, 5, 9, 13, 17]);
    }

    #[test]
    fn addresses_at_top_of_space_wrap_harmlessly() {
        let mut mem = SharedMemory::new(0x4000, 256, 64);
        let mut dut = VaddReactor::new();
        dut.write_reg(BASE_ADDR_LO, u32::MAX - 4);
        dut.write_reg(BASE_ADDR_HI, u32::MAX);
        dut.write_reg(BASE_ADDR_RES_LO, u32::MAX - 4);
        dut.write_reg(BASE_ADDR_RES_HI, u32::MAX);
        dut.write_reg(START, 1);
        dut.write_reg(START, 0);

        for _ in 0..VADD_PAIRS {
            dut.tick(&mut mem);
        }
        assert_eq!(dut.read_reg(DONE), 1);
    }
}
