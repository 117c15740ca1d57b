//! Waveform Tracing.
//!
//! A trace sink receives one sample of every traced signal per simulation
//! step and is closed exactly once when the run ends. The VCD implementation
//! writes a Value Change Dump with one timestamp per step and only the signals
//! that changed since the previous step.

use super::model::SignalSpec;
use crate::common::Result;
use log::info;
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;
use vcd_ng::{IdCode, TimescaleUnit, Value, VecValue};

/// Destination for per-step signal samples.
pub trait TraceSink {
    /// Records the values of all traced signals at step `time`.
    fn sample(&mut self, time: u64, values: &[u64]) -> Result<()>;

    /// Finishes the trace. Consumes the sink, so it cannot be closed twice.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Output shared between the VCD writer and its owner.
///
/// The writer takes its output by value; keeping a second handle lets
/// [`VcdTrace::close`] flush explicitly and report the result.
struct SharedOut<W: Write>(Rc<RefCell<W>>);

impl<W: Write> Write for SharedOut<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// VCD waveform writer.
pub struct VcdTrace<W: Write> {
    writer: vcd_ng::Writer<SharedOut<W>>,
    out: Rc<RefCell<W>>,
    wires: Vec<(IdCode, u32)>,
    last: Vec<Option<u64>>,
    samples: u64,
}

impl VcdTrace<BufWriter<File>> {
    /// Creates the trace file at `path` and writes the VCD header.
    pub fn create(path: &Path, scope: &str, signals: &[SignalSpec]) -> Result<Self> {
        let file = File::create(path)?;
        info!("tracing {} signals to {}", signals.len(), path.display());
        Self::new(BufWriter::new(file), scope, signals)
    }
}

impl<W: Write> VcdTrace<W> {
    /// Writes the VCD header for `signals` under a single module `scope`.
    pub fn new(out: W, scope: &str, signals: &[SignalSpec]) -> Result<Self> {
        let out = Rc::new(RefCell::new(out));
        let mut writer = vcd_ng::Writer::new(SharedOut(out.clone()));
        writer.timescale(1, TimescaleUnit::NS)?;
        writer.add_module(scope)?;
        let mut wires = Vec::with_capacity(signals.len());
        for signal in signals {
            let id = writer.add_wire(signal.width, signal.name)?;
            wires.push((id, signal.width));
        }
        writer.upscope()?;
        writer.enddefinitions()?;

        Ok(Self {
            writer,
            out,
            wires,
            last: vec![None; signals.len()],
            samples: 0,
        })
    }

    /// Returns the number of samples written so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl<W: Write> TraceSink for VcdTrace<W> {
    fn sample(&mut self, time: u64, values: &[u64]) -> Result<()> {
        self.writer.timestamp(time)?;
        for (i, (&(id, width), &value)) in self.wires.iter().zip(values).enumerate() {
            if self.last[i] == Some(value) {
                continue;
            }
            self.last[i] = Some(value);
            if width == 1 {
                self.writer.change_scalar(id, bit(value, 0))?;
            } else {
                let bits: Vec<Value> = (0..width).rev().map(|b| bit(value, b)).collect();
                self.writer.change_vector(id, &VecValue::from(bits))?;
            }
        }
        self.samples += 1;
        Ok(())
    }

    /// Flushes the output. A failed final flush is returned, not swallowed.
    fn close(self: Box<Self>) -> Result<()> {
        let Self {
            writer,
            out,
            samples,
            ..
        } = *self;
        drop(writer);
        out.borrow_mut().flush()?;
        info!("trace closed after {} samples", samples);
        Ok(())
    }
}

fn bit(value: u64, index: u32) -> Value {
    if (value >> index) & 1 == 1 {
        Value::V1
    } else {
        Value::V0
    }
}
