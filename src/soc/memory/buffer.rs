//! Buffer Handles.
//!
//! The host never holds a raw pointer into accelerator memory. Allocations are
//! represented by a [`BufferHandle`] that only exposes the address the
//! accelerator should be given and the size reserved for it; all data movement
//! goes through [`AcceleratorMemory`].

use crate::common::{Result, WideAddress};
use crate::soc::traits::AcceleratorMemory;
use log::{debug, warn};

/// Opaque reference to an allocated accelerator buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    id: u64,
    addr: WideAddress,
    size: usize,
}

impl BufferHandle {
    pub(crate) fn new(id: u64, addr: WideAddress, size: usize) -> Self {
        Self { id, addr, size }
    }

    /// Returns the unique identifier of the allocation.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the accelerator-side address of the buffer.
    ///
    /// This is the value to program into a `set_<baseAddr>` register pair.
    pub fn address(&self) -> WideAddress {
        self.addr
    }

    /// Returns the size in bytes requested at allocation time.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Scoped acquisition of accelerator buffers.
///
/// Buffers allocated through the scope are released in reverse allocation
/// order when [`BufferScope::run`] returns, whether the body succeeded or
/// failed.
///
/// ```ignore
/// BufferScope::run(&mut accel, |accel, scope| {
///     let input = scope.allocate(accel, 80)?;
///     accel.copy_to_accelerator(&bytes, &input, 80)?;
///     accel.set_wide("baseAddr", input.address())?;
///     accel.run(None)
/// })?;
/// ```
#[derive(Debug, Default)]
pub struct BufferScope {
    handles: Vec<BufferHandle>,
}

impl BufferScope {
    /// Runs `body` with a fresh scope and releases everything it allocated.
    ///
    /// If the body fails, its error is returned even when releasing also
    /// fails; the release error is logged. If only releasing fails, the first
    /// release error is returned.
    pub fn run<M, T, F>(mem: &mut M, body: F) -> Result<T>
    where
        M: AcceleratorMemory + ?Sized,
        F: FnOnce(&mut M, &mut BufferScope) -> Result<T>,
    {
        let mut scope = BufferScope::default();
        let result = body(mem, &mut scope);
        let released = scope.release_all(mem);

        match (result, released) {
            (Ok(val), Ok(())) => Ok(val),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release_err)) => {
                warn!("buffer release failed while unwinding: {}", release_err);
                Err(e)
            }
        }
    }

    /// Allocates a buffer whose release is owned by this scope.
    pub fn allocate<M>(&mut self, mem: &mut M, size: usize) -> Result<BufferHandle>
    where
        M: AcceleratorMemory + ?Sized,
    {
        let handle = mem.allocate(size)?;
        self.handles.push(handle);
        Ok(handle)
    }

    /// Releases a scoped buffer early.
    ///
    /// The handle is removed from the scope, so it is not released again on
    /// exit.
    pub fn release<M>(&mut self, mem: &mut M, handle: BufferHandle) -> Result<()>
    where
        M: AcceleratorMemory + ?Sized,
    {
        if let Some(pos) = self.handles.iter().position(|h| *h == handle) {
            self.handles.remove(pos);
        }
        mem.release(handle)
    }

    /// Returns the number of buffers still owned by the scope.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn release_all<M>(&mut self, mem: &mut M) -> Result<()>
    where
        M: AcceleratorMemory + ?Sized,
    {
        let mut first_err = None;
        while let Some(handle) = self.handles.pop() {
            debug!("scope releasing buffer #{}", handle.id());
            if let Err(e) = mem.release(handle) {
                if first_err.is_none() {
                    first_err = Some(e);
                } else {
                    warn!("additional buffer release failure: {}", e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
