//! Shared Memory Pool.
//!
//! A contiguous region of memory that is visible to both the host and the
//! accelerator models. The host reaches it only through the
//! [`AcceleratorMemory`] copy operations; accelerator models read and write
//! it directly by physical address, like a DMA master on a system bus.

use super::buffer::BufferHandle;
use crate::common::{Error, Result, WideAddress};
use crate::soc::traits::AcceleratorMemory;
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// A live allocation inside the pool.
#[derive(Clone, Copy, Debug)]
struct Region {
    offset: usize,
    reserved: usize,
}

/// First-fit allocator over a flat byte array.
pub struct SharedMemory {
    base: u64,
    data: Vec<u8>,
    alignment: usize,
    /// Reserved length of each live region, keyed by offset.
    regions: BTreeMap<usize, usize>,
    /// Live allocations keyed by handle id.
    live: HashMap<u64, Region>,
    next_id: u64,
    /// Total number of successful allocations.
    pub allocations: u64,
    /// Total number of successful releases.
    pub releases: u64,
}

impl SharedMemory {
    /// Creates a pool of `size` bytes mapped at accelerator address `base`.
    ///
    /// # Arguments
    ///
    /// * `base` - Accelerator-side address of the first byte
    /// * `size` - Pool capacity in bytes
    /// * `alignment` - Alignment of every allocation; must be a power of two
    pub fn new(base: u64, size: usize, alignment: usize) -> Self {
        debug_assert!(alignment.is_power_of_two());
        Self {
            base,
            data: vec![0; size],
            alignment,
            regions: BTreeMap::new(),
            live: HashMap::new(),
            next_id: 1,
            allocations: 0,
            releases: 0,
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of bytes currently reserved, including alignment padding.
    pub fn used(&self) -> usize {
        self.regions.values().sum()
    }

    /// Returns the number of allocations not yet released.
    pub fn live_buffers(&self) -> usize {
        self.live.len()
    }

    /// Rounds `val` up to the alignment, or `None` if that overflows.
    fn align_up(&self, val: usize) -> Option<usize> {
        val.checked_add(self.alignment - 1)
            .map(|v| v & !(self.alignment - 1))
    }

    /// Finds the first gap that can hold `reserved` bytes.
    fn find_gap(&self, reserved: usize) -> Option<usize> {
        let mut cursor = 0usize;
        for (&offset, &len) in &self.regions {
            if offset >= cursor && offset - cursor >= reserved {
                return Some(cursor);
            }
            cursor = self.align_up(offset + len)?;
        }
        if self.data.len() >= cursor && self.data.len() - cursor >= reserved {
            Some(cursor)
        } else {
            None
        }
    }

    fn region(&self, handle: &BufferHandle) -> Result<Region> {
        self.live
            .get(&handle.id())
            .copied()
            .ok_or(Error::InvalidHandle(handle.id()))
    }

    /// Translates an accelerator address range into a slice range of the pool.
    fn translate(&self, addr: u64, len: usize) -> Option<std::ops::Range<usize>> {
        let offset = usize::try_from(addr.checked_sub(self.base)?).ok()?;
        let end = offset.checked_add(len)?;
        if end <= self.data.len() {
            Some(offset..end)
        } else {
            None
        }
    }

    /// Reads a little-endian double-word at an accelerator address.
    ///
    /// Addresses outside the pool read as zero.
    pub fn read_u64(&self, addr: u64) -> u64 {
        match self.translate(addr, 8) {
            Some(range) => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&self.data[range]);
                u64::from_le_bytes(buf)
            }
            None => 0,
        }
    }

    /// Writes a little-endian double-word at an accelerator address.
    ///
    /// Writes outside the pool are dropped.
    pub fn write_u64(&mut self, addr: u64, val: u64) {
        if let Some(range) = self.translate(addr, 8) {
            self.data[range].copy_from_slice(&val.to_le_bytes());
        }
    }
}

impl AcceleratorMemory for SharedMemory {
    fn allocate(&mut self, size: usize) -> Result<BufferHandle> {
        let out_of_memory = Error::OutOfMemory {
            requested: size,
            available: self.capacity() - self.used(),
        };
        let Some(reserved) = self.align_up(size.max(1)).filter(|&r| r <= self.capacity()) else {
            return Err(out_of_memory);
        };
        let Some(offset) = self.find_gap(reserved) else {
            return Err(out_of_memory);
        };
        let Some(addr) = self.base.checked_add(offset as u64) else {
            return Err(out_of_memory);
        };

        let id = self.next_id;
        self.next_id += 1;
        self.regions.insert(offset, reserved);
        self.live.insert(id, Region { offset, reserved });
        self.allocations += 1;

        let addr = WideAddress::new(addr);
        debug!("allocated buffer #{} ({} bytes) @ {}", id, size, addr);
        Ok(BufferHandle::new(id, addr, size))
    }

    fn copy_to_accelerator(
        &mut self,
        host: &[u8],
        handle: &BufferHandle,
        size: usize,
    ) -> Result<()> {
        let region = self.region(handle)?;
        check_copy(size, handle.size(), host.len())?;
        self.data[region.offset..region.offset + size].copy_from_slice(&host[..size]);
        Ok(())
    }

    fn copy_to_host(&mut self, handle: &BufferHandle, host: &mut [u8], size: usize) -> Result<()> {
        let region = self.region(handle)?;
        check_copy(size, handle.size(), host.len())?;
        host[..size].copy_from_slice(&self.data[region.offset..region.offset + size]);
        Ok(())
    }

    fn release(&mut self, handle: BufferHandle) -> Result<()> {
        let region = self
            .live
            .remove(&handle.id())
            .ok_or(Error::InvalidHandle(handle.id()))?;
        self.regions.remove(&region.offset);
        self.releases += 1;
        debug!(
            "released buffer #{} ({} bytes reserved)",
            handle.id(),
            region.reserved
        );
        Ok(())
    }
}

/// Validates a copy length against both the buffer and the host slice.
fn check_copy(size: usize, buffer_size: usize, host_len: usize) -> Result<()> {
    if size > buffer_size {
        return Err(Error::SizeMismatch {
            requested: size,
            capacity: buffer_size,
        });
    }
    if size > host_len {
        return Err(Error::SizeMismatch {
            requested: size,
            capacity: host_len,
        });
    }
    Ok(())
}
