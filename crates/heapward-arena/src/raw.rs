//! Low-level ownership of the arena's backing memory.
//!
//! The only module in this crate that contains `unsafe`. Each block
//! carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::ptr::NonNull;

use crate::error::ArenaError;

/// A contiguous, zero-initialised, read-write mapping owned exclusively
/// by one arena. Unmapped on drop.
pub(crate) struct OsRegion {
    ptr: NonNull<u8>,
    len: usize,
}

// SAFETY: the mapping is owned exclusively by this value; nothing else
// holds the pointer, so moving it to another thread is sound.
unsafe impl Send for OsRegion {}

impl OsRegion {
    /// Map `len` bytes. `len` must be non-zero.
    #[cfg(unix)]
    pub(crate) fn map(len: usize) -> Result<Self, ArenaError> {
        // SAFETY: anonymous private mapping with no fixed address; the
        // kernel picks the placement and the result is checked below.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(ArenaError::MapFailed {
                capacity: len,
                errno: std::io::Error::last_os_error().raw_os_error(),
            });
        }
        let ptr = NonNull::new(ptr.cast::<u8>()).ok_or(ArenaError::MapFailed {
            capacity: len,
            errno: None,
        })?;
        log::debug!("mapped {len}-byte arena at {:p}", ptr.as_ptr());
        Ok(Self { ptr, len })
    }

    /// Map `len` bytes. `len` must be non-zero.
    #[cfg(not(unix))]
    pub(crate) fn map(len: usize) -> Result<Self, ArenaError> {
        let layout = Self::layout(len)?;
        // SAFETY: layout has non-zero size (validated by HeapConfig).
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).ok_or(ArenaError::MapFailed {
            capacity: len,
            errno: None,
        })?;
        log::debug!("allocated {len}-byte arena at {:p}", ptr.as_ptr());
        Ok(Self { ptr, len })
    }

    #[cfg(not(unix))]
    fn layout(len: usize) -> Result<std::alloc::Layout, ArenaError> {
        std::alloc::Layout::from_size_align(len, 4096).map_err(|_| ArenaError::MapFailed {
            capacity: len,
            errno: None,
        })
    }

    /// Base pointer of the mapping.
    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Numeric base address of the mapping.
    pub(crate) fn base(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Length of the mapping in bytes.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The whole mapping as a shared slice.
    pub(crate) fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for reads of len bytes for as long as self
        // lives, the memory is initialised (zero-filled at map time), and
        // the returned borrow ties it to &self.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The whole mapping as a mutable slice.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as for as_slice; &mut self guarantees no other Rust
        // borrow of the mapping is live.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for OsRegion {
    #[cfg(unix)]
    fn drop(&mut self) {
        // SAFETY: ptr/len describe exactly the mapping created in map(),
        // which has not been unmapped before (drop runs once).
        let rc = unsafe { libc::munmap(self.ptr.as_ptr().cast(), self.len) };
        if rc != 0 {
            log::warn!(
                "munmap of {}-byte arena at {:p} failed: {}",
                self.len,
                self.ptr.as_ptr(),
                std::io::Error::last_os_error()
            );
        } else {
            log::debug!("unmapped {}-byte arena at {:p}", self.len, self.ptr.as_ptr());
        }
    }

    #[cfg(not(unix))]
    fn drop(&mut self) {
        if let Ok(layout) = Self::layout(self.len) {
            // SAFETY: ptr was returned by alloc_zeroed with this layout.
            unsafe { std::alloc::dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_zeroed_and_writable() {
        let mut region = OsRegion::map(4096).unwrap();
        assert_eq!(region.len(), 4096);
        assert!(region.as_slice().iter().all(|&b| b == 0));
        region.as_mut_slice()[4095] = 0xAB;
        assert_eq!(region.as_slice()[4095], 0xAB);
    }

    #[test]
    fn base_is_page_aligned() {
        let region = OsRegion::map(8192).unwrap();
        assert_eq!(region.base() % 4096, 0);
        assert_eq!(region.as_ptr() as usize, region.base());
    }
}
