//! Host Scenarios.
//!
//! End-to-end transactions against the reactor models: program the inputs,
//! pulse start, wait for done, read back and check the results. The returned
//! report carries every comparison; callers decide how to treat a mismatch.

use crate::common::{Error, RegValue, Result};
use crate::core::control::Accelerator;
use crate::soc::memory::BufferScope;
use crate::soc::traits::{AcceleratorMemory, Platform};
use crate::system::devices::vadd::VADD_PAIRS;
use crate::verify::{verify, VerificationReport};
use log::info;
use std::time::Duration;

/// Input used by the single-register scenario.
pub const TOP_INPUT: RegValue = 42;

/// Number of 64-bit input words consumed by one vadd transaction.
pub const VADD_INPUTS: usize = 2 * VADD_PAIRS;

const WORD: usize = std::mem::size_of::<u64>();

/// Drives one `TopReactorEx` transaction.
///
/// Expects `out1 = input + 6` and `out2 = input + 4`, both present.
pub fn run_top_reactor<P: Platform>(
    accel: &mut Accelerator<P>,
    input: RegValue,
    deadline: Option<Duration>,
) -> Result<VerificationReport> {
    accel.set("in_present", 1)?;
    accel.set("in_data", input)?;
    accel.run(deadline)?;

    let mut report = VerificationReport::new(accel.map().name());
    let out1_present = accel.get("out1_present")?;
    let out1 = accel.get("out1_data")?;
    let out2_present = accel.get("out2_present")?;
    let out2 = accel.get("out2_data")?;

    report.check("out1_present", out1_present as u64, 1);
    report.check("out1", out1 as u64, input.wrapping_add(6) as u64);
    report.check("out2_present", out2_present as u64, 1);
    report.check("out2", out2 as u64, input.wrapping_add(4) as u64);
    info!("top reactor: in={} out1={} out2={}", input, out1, out2);
    Ok(report)
}

/// Drives one `VaddReactor` transaction over `inputs`.
///
/// Output `i` is expected to be `inputs[2i] + inputs[2i + 1]`. The cycle
/// count reported by the accelerator is recorded as a report metric. Both
/// buffers are released on every exit path.
///
/// # Errors
///
/// Returns [`Error::SizeMismatch`] unless exactly [`VADD_INPUTS`] words are
/// given.
pub fn run_vadd<P: Platform>(
    accel: &mut Accelerator<P>,
    inputs: &[u64],
    deadline: Option<Duration>,
) -> Result<VerificationReport> {
    if inputs.len() != VADD_INPUTS {
        return Err(Error::SizeMismatch {
            requested: inputs.len() * WORD,
            capacity: VADD_INPUTS * WORD,
        });
    }

    let in_bytes: Vec<u8> = inputs.iter().flat_map(|w| w.to_le_bytes()).collect();
    let in_size = in_bytes.len();
    let out_size = VADD_PAIRS * WORD;

    let (outputs, cycles) = BufferScope::run(accel, |accel, scope| {
        let src = scope.allocate(accel, in_size)?;
        let dst = scope.allocate(accel, out_size)?;
        accel.copy_to_accelerator(&in_bytes, &src, in_size)?;
        accel.set_wide("baseAddr", src.address())?;
        accel.set_wide("baseAddrRes", dst.address())?;

        accel.run(deadline)?;

        let mut out_bytes = vec![0u8; out_size];
        accel.copy_to_host(&dst, &mut out_bytes, out_size)?;
        let cycles = accel.get("cycles")?;
        Ok((words(&out_bytes), cycles))
    })?;

    let mut report = verify(
        accel.map().name(),
        outputs.into_iter().enumerate(),
        |&i| inputs[2 * i].wrapping_add(inputs[2 * i + 1]),
    );
    report.metric("cycles", cycles as u64);
    info!("vadd reactor finished in {} cycles", cycles);
    Ok(report)
}

/// Reads the accelerator's signature register.
pub fn read_signature<P: Platform>(accel: &mut Accelerator<P>) -> Result<RegValue> {
    accel.signature()
}

fn words(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks_exact(WORD)
        .map(|chunk| {
            let mut word = [0u8; WORD];
            word.copy_from_slice(chunk);
            u64::from_le_bytes(word)
        })
        .collect()
}
