//! Raw memory regions obtained directly from the operating system.
//!
//! A region is an anonymous memory mapping, so it never touches the global
//! allocator and the kernel hands out zeroed pages lazily.
//!
//! A failed mapping is not recoverable: it is logged and the process aborts.

use std::mem;
use std::process;
use std::ptr::NonNull;

use memmap2::MmapMut;
use tracing::{error, trace};

/// Mappings are page aligned; no supported platform pages at less than this.
const PAGE_ALIGN: usize = 4096;

/// Owns `bytes` bytes of zero-initialised memory, unmapped on drop.
///
/// Zero-sized regions hold no mapping and a dangling pointer aligned for the
/// element type they were created for.
pub(crate) struct Region {
    ptr: NonNull<u8>,
    bytes: usize,
    map: Option<MmapMut>,
}

impl Region {
    /// An empty region for elements of type `T`.
    pub(crate) fn empty<T>() -> Self {
        Self {
            ptr: NonNull::<T>::dangling().cast(),
            bytes: 0,
            map: None,
        }
    }

    /// Map a zeroed region large enough for `capacity` values of `T`.
    pub(crate) fn map<T>(capacity: usize) -> Self {
        let Some(bytes) = mem::size_of::<T>().checked_mul(capacity) else {
            error!(capacity, width = mem::size_of::<T>(), "region size overflows usize");
            process::abort();
        };
        if bytes == 0 {
            return Self::empty::<T>();
        }
        assert!(
            mem::align_of::<T>() <= PAGE_ALIGN,
            "element alignment {} exceeds page alignment",
            mem::align_of::<T>()
        );

        let mut map = match MmapMut::map_anon(bytes) {
            Ok(map) => map,
            Err(err) => {
                error!(bytes, %err, "anonymous mapping failed");
                process::abort();
            }
        };
        let Some(ptr) = NonNull::new(map.as_mut_ptr()) else {
            error!(bytes, "anonymous mapping returned a null address");
            process::abort();
        };
        trace!(bytes, addr = ?ptr, "mapped region");

        Self {
            ptr,
            bytes,
            map: Some(map),
        }
    }

    #[inline]
    pub(crate) fn as_ptr<T>(&self) -> *mut T {
        self.ptr.as_ptr().cast()
    }

    #[inline]
    pub(crate) fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if let Some(map) = self.map.take() {
            drop(map);
            trace!(bytes = self.bytes, addr = ?self.ptr, "unmapped region");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_is_zeroed() {
        let region = Region::map::<u64>(1024);
        assert_eq!(region.bytes(), 8 * 1024);

        let ptr = region.as_ptr::<u64>();
        assert_eq!(ptr as usize % PAGE_ALIGN, 0);
        for i in 0..1024 {
            // SAFETY: in bounds of a live, zeroed mapping.
            assert_eq!(unsafe { ptr.add(i).read() }, 0);
        }
    }

    #[test]
    fn test_map_is_writable() {
        let region = Region::map::<u32>(3);
        let ptr = region.as_ptr::<u32>();
        // SAFETY: all three slots lie inside the live mapping.
        unsafe {
            ptr.add(2).write(7);
            assert_eq!(ptr.add(2).read(), 7);
            assert_eq!(ptr.read(), 0);
        }
    }

    #[test]
    fn test_zero_sized_regions() {
        let region = Region::map::<u32>(0);
        assert_eq!(region.bytes(), 0);
        assert_eq!(region.as_ptr::<u32>() as usize % mem::align_of::<u32>(), 0);

        let zst = Region::map::<()>(1_000_000);
        assert_eq!(zst.bytes(), 0);
    }
}
