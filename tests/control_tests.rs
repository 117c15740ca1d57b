//! Integration tests for the accelerator control protocol.

use std::time::Duration;

use reactor_platform::common::{Error, RegValue, Result, WideAddress};
use reactor_platform::config::Config;
use reactor_platform::core::{Accelerator, ControlState};
use reactor_platform::soc::{
    init_platform, AcceleratorMemory, BufferHandle, Platform, RegisterTransport, SimPlatform,
};
use reactor_platform::system::devices::top_reactor;
use reactor_platform::system::ReactorKind;

fn platform(kind: ReactorKind) -> SimPlatform {
    init_platform(&Config::default(), kind).unwrap()
}

fn attach(kind: ReactorKind) -> Accelerator<SimPlatform> {
    Accelerator::attach(platform(kind), kind.register_map()).unwrap()
}

/// Platform wrapper whose `done` register never rises.
struct StuckDone {
    inner: SimPlatform,
    done: u32,
}

impl RegisterTransport for StuckDone {
    fn read_reg(&mut self, index: u32) -> Result<RegValue> {
        let value = self.inner.read_reg(index)?;
        Ok(if index == self.done { 0 } else { value })
    }

    fn write_reg(&mut self, index: u32, value: RegValue) -> Result<()> {
        self.inner.write_reg(index, value)
    }
}

impl AcceleratorMemory for StuckDone {
    fn allocate(&mut self, size: usize) -> Result<BufferHandle> {
        self.inner.allocate(size)
    }

    fn copy_to_accelerator(&mut self, host: &[u8], handle: &BufferHandle, size: usize) -> Result<()> {
        self.inner.copy_to_accelerator(host, handle, size)
    }

    fn copy_to_host(&mut self, handle: &BufferHandle, host: &mut [u8], size: usize) -> Result<()> {
        self.inner.copy_to_host(handle, host, size)
    }

    fn release(&mut self, handle: BufferHandle) -> Result<()> {
        self.inner.release(handle)
    }
}

impl Platform for StuckDone {
    fn name(&self) -> &str {
        "stuck-done"
    }
}

/// Tests that a fresh accelerator is idle and reports its signature.
#[test]
fn test_attach_starts_idle() {
    let mut accel = attach(ReactorKind::Top);
    assert_eq!(accel.state(), ControlState::Idle);
    assert_eq!(accel.signature().unwrap(), top_reactor::TOP_SIGNATURE);
}

/// Tests that attaching with the wrong register map fails initialization.
#[test]
fn test_signature_mismatch() {
    let result = Accelerator::attach(platform(ReactorKind::Top), ReactorKind::Vadd.register_map());
    match result {
        Err(e) => assert!(e.is_initialization(), "unexpected {:?}", e),
        Ok(_) => panic!("attach should fail"),
    }
}

/// Tests that holding start high never triggers a transaction.
#[test]
fn test_level_held_start_never_completes() {
    let mut sim = platform(ReactorKind::Top);
    sim.write_reg(top_reactor::START, 1).unwrap();
    for _ in 0..32 {
        assert_eq!(sim.read_reg(top_reactor::DONE).unwrap(), 0);
    }

    sim.write_reg(top_reactor::START, 0).unwrap();
    let mut polls = 0;
    while sim.read_reg(top_reactor::DONE).unwrap() == 0 {
        polls += 1;
        assert!(polls < 32, "falling edge should start the reactor");
    }
}

/// Tests the full Idle, Running, Done sequence.
#[test]
fn test_run_reaches_done() {
    let mut accel = attach(ReactorKind::Top);
    accel.set("in_present", 1).unwrap();
    accel.set("in_data", 42).unwrap();

    accel.start().unwrap();
    assert_eq!(accel.state(), ControlState::Running);
    accel.wait_done().unwrap();
    assert_eq!(accel.state(), ControlState::Done);
    assert!(accel.polls() >= 1);

    assert_eq!(accel.get("out1_data").unwrap(), 48);
    assert_eq!(accel.get("out2_data").unwrap(), 46);
    assert!(accel.is_done().unwrap());
}

/// Tests that result registers cannot be read before completion.
#[test]
fn test_output_read_gated_on_done() {
    let mut accel = attach(ReactorKind::Top);
    assert!(matches!(
        accel.get("out1_data"),
        Err(Error::InvalidState { state: "idle", .. })
    ));

    accel.start().unwrap();
    assert!(matches!(
        accel.get("out1_data"),
        Err(Error::InvalidState { state: "running", .. })
    ));

    // Status and input registers stay readable.
    accel.get("done").unwrap();
    accel.get("in_data").unwrap();
}

/// Tests that a second start is rejected instead of re-arming.
#[test]
fn test_start_is_single_shot() {
    let mut accel = attach(ReactorKind::Top);
    accel.start().unwrap();
    assert!(matches!(
        accel.start(),
        Err(Error::InvalidState { operation: "start", state: "running" })
    ));

    accel.wait_done().unwrap();
    assert!(matches!(
        accel.start(),
        Err(Error::InvalidState { operation: "start", state: "done" })
    ));
}

/// Tests that waiting before a start is an error rather than a hang.
#[test]
fn test_wait_in_idle() {
    let mut accel = attach(ReactorKind::Top);
    assert!(matches!(accel.wait_done(), Err(Error::InvalidState { .. })));
    assert!(matches!(accel.is_done(), Err(Error::InvalidState { .. })));
}

/// Tests that the start register can only be driven through a pulse.
#[test]
fn test_start_not_settable() {
    let mut accel = attach(ReactorKind::Top);
    assert!(matches!(accel.set("start", 1), Err(Error::InvalidState { .. })));
    assert_eq!(accel.state(), ControlState::Idle);
}

/// Tests that polling gives up after the deadline when done never rises.
#[test]
fn test_wait_timeout() {
    let inner = platform(ReactorKind::Top);
    let stuck = StuckDone {
        inner,
        done: top_reactor::DONE,
    };
    let mut accel = Accelerator::attach(stuck, ReactorKind::Top.register_map()).unwrap();

    match accel.run(Some(Duration::from_millis(20))) {
        Err(Error::Timeout { register, waited }) => {
            assert_eq!(register, "done");
            assert!(waited >= Duration::from_millis(20));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(accel.state(), ControlState::Running);
}

/// Tests that buffers cannot be copied back while a transaction is running.
#[test]
fn test_copy_to_host_while_running() {
    let mut accel = attach(ReactorKind::Vadd);
    let buf = accel.allocate(8).unwrap();
    accel.start().unwrap();

    let mut out = [0u8; 8];
    assert!(matches!(
        accel.copy_to_host(&buf, &mut out, 8),
        Err(Error::InvalidState { .. })
    ));

    accel.wait_done().unwrap();
    accel.copy_to_host(&buf, &mut out, 8).unwrap();
    accel.release(buf).unwrap();
}

/// Tests that result registers hold their values across repeated reads after done.
#[test]
fn test_top_outputs_stable_after_done() {
    let mut accel = attach(ReactorKind::Top);
    accel.set("in_present", 1).unwrap();
    accel.set("in_data", 42).unwrap();
    accel.run(None).unwrap();

    for _ in 0..8 {
        assert_eq!(accel.get("out1_data").unwrap(), 48);
        assert_eq!(accel.get("out2_data").unwrap(), 46);
        assert!(accel.is_done().unwrap());
    }
    assert_eq!(accel.state(), ControlState::Done);
}

/// Tests that the vadd output buffer does not change once the transaction is done.
#[test]
fn test_vadd_output_stable_after_done() {
    let mut accel = attach(ReactorKind::Vadd);
    let inputs: Vec<u8> = (0u64..10).flat_map(|w| w.to_le_bytes()).collect();
    let src = accel.allocate(inputs.len()).unwrap();
    let dst = accel.allocate(40).unwrap();
    accel.copy_to_accelerator(&inputs, &src, inputs.len()).unwrap();
    accel.set_wide("baseAddr", src.address()).unwrap();
    accel.set_wide("baseAddrRes", dst.address()).unwrap();
    accel.run(None).unwrap();

    let mut first = [0u8; 40];
    accel.copy_to_host(&dst, &mut first, 40).unwrap();
    let sums: Vec<u64> = first
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
        .collect();
    assert_eq!(sums, vec![1, 5, 9, 13, 17]);

    let cycles = accel.get("cycles").unwrap();
    for _ in 0..8 {
        let mut again = [0u8; 40];
        accel.copy_to_host(&dst, &mut again, 40).unwrap();
        assert_eq!(again, first);
        assert_eq!(accel.get("cycles").unwrap(), cycles);
    }
    accel.release(dst).unwrap();
    accel.release(src).unwrap();
}

/// Tests that buffer addresses at the very top of the address space complete without faulting.
#[test]
fn test_vadd_top_of_address_space() {
    let mut accel = attach(ReactorKind::Vadd);
    accel.set_wide("baseAddr", WideAddress::new(u64::MAX - 4)).unwrap();
    accel.set_wide("baseAddrRes", WideAddress::new(u64::MAX - 4)).unwrap();
    accel.run(None).unwrap();
    assert_eq!(accel.state(), ControlState::Done);
}
