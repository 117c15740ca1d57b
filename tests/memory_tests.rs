//! Integration tests for accelerator memory and scoped buffers.

use reactor_platform::common::{Error, Result};
use reactor_platform::soc::{AcceleratorMemory, BufferHandle, BufferScope, SharedMemory};

fn pool() -> SharedMemory {
    SharedMemory::new(0x4000_0000, 1024, 64)
}

/// Memory wrapper that fails host-to-accelerator copies and records releases.
struct FaultyMemory {
    inner: SharedMemory,
    fail_copies: bool,
    released: Vec<u64>,
}

impl FaultyMemory {
    fn new(fail_copies: bool) -> Self {
        Self {
            inner: pool(),
            fail_copies,
            released: Vec::new(),
        }
    }
}

impl AcceleratorMemory for FaultyMemory {
    fn allocate(&mut self, size: usize) -> Result<BufferHandle> {
        self.inner.allocate(size)
    }

    fn copy_to_accelerator(&mut self, host: &[u8], handle: &BufferHandle, size: usize) -> Result<()> {
        if self.fail_copies {
            return Err(Error::Transport {
                register: "dma".into(),
                reason: "injected fault".into(),
            });
        }
        self.inner.copy_to_accelerator(host, handle, size)
    }

    fn copy_to_host(&mut self, handle: &BufferHandle, host: &mut [u8], size: usize) -> Result<()> {
        self.inner.copy_to_host(handle, host, size)
    }

    fn release(&mut self, handle: BufferHandle) -> Result<()> {
        self.released.push(handle.id());
        self.inner.release(handle)
    }
}

/// Tests that data copied to the accelerator is copied back unchanged.
#[test]
fn test_copy_roundtrip() {
    let mut mem = pool();
    let buf = mem.allocate(16).unwrap();
    let data: Vec<u8> = (0..16).collect();
    mem.copy_to_accelerator(&data, &buf, 16).unwrap();

    let mut back = vec![0u8; 16];
    mem.copy_to_host(&buf, &mut back, 16).unwrap();
    assert_eq!(back, data);
}

/// Tests that the accelerator sees copied data at the handle's address.
#[test]
fn test_handle_address_is_accelerator_visible() {
    let mut mem = pool();
    let buf = mem.allocate(8).unwrap();
    mem.copy_to_accelerator(&42u64.to_le_bytes(), &buf, 8).unwrap();
    assert_eq!(mem.read_u64(buf.address().val()), 42);
}

/// Tests that copies larger than the buffer are rejected.
#[test]
fn test_oversize_copy_rejected() {
    let mut mem = pool();
    let buf = mem.allocate(8).unwrap();
    let data = [0u8; 16];
    assert!(matches!(
        mem.copy_to_accelerator(&data, &buf, 16),
        Err(Error::SizeMismatch { requested: 16, capacity: 8 })
    ));

    let mut small = [0u8; 4];
    assert!(matches!(
        mem.copy_to_host(&buf, &mut small, 8),
        Err(Error::SizeMismatch { requested: 8, capacity: 4 })
    ));
}

/// Tests that allocation beyond the pool capacity fails.
#[test]
fn test_out_of_memory() {
    let mut mem = pool();
    let _a = mem.allocate(1000).unwrap();
    match mem.allocate(64) {
        Err(Error::OutOfMemory { requested, available }) => {
            assert_eq!(requested, 64);
            assert_eq!(available, 0);
        }
        other => panic!("unexpected {:?}", other),
    }
}

/// Tests that releasing a handle twice fails the second time.
#[test]
fn test_double_release() {
    let mut mem = pool();
    let buf = mem.allocate(32).unwrap();
    mem.release(buf).unwrap();
    assert!(matches!(mem.release(buf), Err(Error::InvalidHandle(id)) if id == buf.id()));
    assert_eq!(mem.live_buffers(), 0);
}

/// Tests that a released handle can no longer be copied through.
#[test]
fn test_copy_after_release() {
    let mut mem = pool();
    let buf = mem.allocate(8).unwrap();
    mem.release(buf).unwrap();
    assert!(matches!(
        mem.copy_to_accelerator(&[0u8; 8], &buf, 8),
        Err(Error::InvalidHandle(_))
    ));
}

/// Tests that a scope releases all of its buffers in reverse order on success.
#[test]
fn test_scope_releases_in_reverse_order() {
    let mut mem = FaultyMemory::new(false);
    let (a, b) = BufferScope::run(&mut mem, |mem, scope| {
        let a = scope.allocate(mem, 8)?;
        let b = scope.allocate(mem, 8)?;
        assert_eq!(scope.len(), 2);
        Ok((a, b))
    })
    .unwrap();

    assert_eq!(mem.released, vec![b.id(), a.id()]);
    assert_eq!(mem.inner.live_buffers(), 0);
}

/// Tests that a fault after allocation still releases every buffer exactly once.
#[test]
fn test_scope_releases_on_fault() {
    let mut mem = FaultyMemory::new(true);
    let result: Result<()> = BufferScope::run(&mut mem, |mem, scope| {
        let buf = scope.allocate(mem, 16)?;
        let _other = scope.allocate(mem, 16)?;
        mem.copy_to_accelerator(&[1u8; 16], &buf, 16)?;
        unreachable!("copy should have failed");
    });

    assert!(matches!(result, Err(Error::Transport { .. })));
    assert_eq!(mem.released.len(), 2);
    assert_eq!(mem.inner.releases, 2);
    assert_eq!(mem.inner.live_buffers(), 0);
}

/// Tests that an early release inside a scope is not repeated on exit.
#[test]
fn test_scope_early_release() {
    let mut mem = FaultyMemory::new(false);
    BufferScope::run(&mut mem, |mem, scope| {
        let buf = scope.allocate(mem, 8)?;
        scope.release(mem, buf)?;
        assert!(scope.is_empty());
        Ok(())
    })
    .unwrap();

    assert_eq!(mem.released.len(), 1);
}

/// Tests that a zero-byte allocation still yields a distinct buffer.
#[test]
fn test_zero_byte_allocation() {
    let mut mem = pool();
    let a = mem.allocate(0).unwrap();
    let b = mem.allocate(0).unwrap();
    assert_ne!(a.address(), b.address());
    assert_eq!(mem.used(), 128);
}

/// Tests that a request too large to align is refused instead of wrapping.
#[test]
fn test_huge_allocation_is_out_of_memory() {
    let mut mem = pool();
    for size in [usize::MAX, usize::MAX - 63, 1025] {
        match mem.allocate(size) {
            Err(Error::OutOfMemory { requested, available }) => {
                assert_eq!(requested, size);
                assert_eq!(available, 1024);
            }
            other => panic!("size {}: unexpected {:?}", size, other),
        }
    }
    assert_eq!(mem.live_buffers(), 0);
    assert_eq!(mem.allocate(1024).unwrap().size(), 1024);
}

/// Tests that a pool mapped at the top of the address space never hands out a wrapped address.
#[test]
fn test_allocation_address_does_not_wrap() {
    let mut mem = SharedMemory::new(u64::MAX - 63, 256, 64);
    let first = mem.allocate(8).unwrap();
    assert_eq!(first.address().val(), u64::MAX - 63);
    assert!(matches!(mem.allocate(8), Err(Error::OutOfMemory { .. })));
    assert_eq!(mem.live_buffers(), 1);
}
