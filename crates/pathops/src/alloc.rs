//! Throwing allocation primitive.
//!
//! `malloc_throw(count, elem_size)` hands out exactly `count × elem_size`
//! bytes or ends the process: an overflowing product and an allocator
//! refusal are both fatal, never a null or truncated block. Memory is zeroed
//! and released when the `RawBlock` drops.

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;

/// Alignment of every block (the platform's `max_align_t`).
pub const ALIGN: usize = 16;

/// Why a size request cannot be turned into a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// `count × elem_size` does not fit in `usize`.
    Overflow { count: usize, elem_size: usize },
    /// The product exceeds the largest allocatable size.
    TooLarge { size: usize },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow { count, elem_size } => {
                write!(f, "allocation size overflows: {count} × {elem_size} bytes")
            }
            Self::TooLarge { size } => write!(f, "allocation of {size} bytes is too large"),
        }
    }
}

impl std::error::Error for AllocError {}

/// Overflow-checked `count × elem_size`.
#[inline]
pub fn checked_size(count: usize, elem_size: usize) -> Result<usize, AllocError> {
    count
        .checked_mul(elem_size)
        .ok_or(AllocError::Overflow { count, elem_size })
}

fn layout_for(count: usize, elem_size: usize) -> Result<Layout, AllocError> {
    let size = checked_size(count, elem_size)?;
    Layout::from_size_align(size, ALIGN).map_err(|_| AllocError::TooLarge { size })
}

/// Owned, zeroed, 16-byte aligned byte block.
#[derive(Debug)]
pub struct RawBlock {
    ptr: NonNull<u8>,
    len: usize,
}

impl RawBlock {
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `len` initialised (zeroed) bytes, or
        // dangling with `len == 0`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_slice`; `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }
        // SAFETY: non-empty blocks come from `alloc_zeroed` with exactly this
        // size and `ALIGN`, which `layout_for` already validated.
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.len, ALIGN);
            alloc::dealloc(self.ptr.as_ptr(), layout);
        }
    }
}

/// Allocate `count × elem_size` bytes, terminating the process when the
/// product overflows or the allocator refuses.
pub fn malloc_throw(count: usize, elem_size: usize) -> RawBlock {
    let layout = match layout_for(count, elem_size) {
        Ok(layout) => layout,
        Err(err) => fatal(err),
    };
    if layout.size() == 0 {
        return RawBlock {
            ptr: NonNull::dangling(),
            len: 0,
        };
    }
    // SAFETY: `layout` has a non-zero size.
    let raw = unsafe { alloc::alloc_zeroed(layout) };
    match NonNull::new(raw) {
        Some(ptr) => RawBlock {
            ptr,
            len: layout.size(),
        },
        None => alloc::handle_alloc_error(layout),
    }
}

fn fatal(err: AllocError) -> ! {
    tracing::error!(%err, "fatal allocation request");
    std::process::abort()
}
