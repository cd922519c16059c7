//! Aligned buffer storage entity.
//!
//! One fixed-capacity, fixed-alignment array of code units with three
//! cursors. `begin` is always index 0 of the allocation; `current` and `end`
//! are indices into it. What `end` means depends on the owner: input buffers
//! keep the fill level there, output buffers keep the writable limit.

use crate::domain::{error::AllocError, value_objects::CodeUnit};
use aligned::{Alignment, A64};
use alloc::alloc::{alloc_zeroed, dealloc, Layout};
use core::{fmt, marker::PhantomData, mem, ptr::NonNull, slice};

/// Owned, lazily allocated, aligned buffer of `CAP` code units.
///
/// A freshly constructed storage is *cold*: nothing is allocated and all
/// cursors are zero. [`init_space`](Self::init_space) allocates on first use;
/// [`release`](Self::release) and `Drop` give the memory back.
///
/// # Type Parameters
///
/// - `T`: The code unit type
/// - `CAP`: Capacity in code units (must be non-zero)
/// - `A`: Alignment marker from the `aligned` crate; the allocation is aligned
///   to the larger of `A` and `T`
///
/// # Invariants
///
/// - cold ⇒ `current == end == 0`
/// - allocated ⇒ `current <= end <= CAP`
///
/// The storage is move-only. Moving it moves the allocation; there is no
/// `Clone`.
pub struct BufferStorage<T: CodeUnit, const CAP: usize, A: Alignment = A64> {
    ptr: Option<NonNull<T>>,
    current: usize,
    end: usize,
    _align: PhantomData<A>,
}

// SAFETY: the storage uniquely owns its allocation, like a `Box<[T]>`.
unsafe impl<T: CodeUnit, const CAP: usize, A: Alignment> Send for BufferStorage<T, CAP, A> {}
// SAFETY: shared access only hands out `&[T]`.
unsafe impl<T: CodeUnit, const CAP: usize, A: Alignment> Sync for BufferStorage<T, CAP, A> {}

impl<T: CodeUnit, const CAP: usize, A: Alignment> BufferStorage<T, CAP, A> {
    /// Capacity in code units.
    pub const CAPACITY: usize = CAP;

    /// Create a cold storage. Nothing is allocated.
    pub const fn new() -> Self {
        Self {
            ptr: None,
            current: 0,
            end: 0,
            _align: PhantomData,
        }
    }

    /// Capacity in code units.
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Alignment of the allocation in bytes.
    pub const fn alignment() -> usize {
        let a = mem::align_of::<A>();
        let t = mem::align_of::<T>();
        if a > t { a } else { t }
    }

    fn layout() -> Result<Layout, AllocError> {
        let err = AllocError {
            bytes: CAP.saturating_mul(mem::size_of::<T>()),
            align: Self::alignment(),
        };
        let bytes = CAP.checked_mul(mem::size_of::<T>()).ok_or(err)?;
        Layout::from_size_align(bytes, Self::alignment()).map_err(|_| err)
    }

    /// Allocate the buffer if it is cold.
    ///
    /// After a successful allocation `current == end == 0`. Calling this on
    /// an allocated storage is a no-op and keeps the cursors.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the allocator refuses the request.
    pub fn init_space(&mut self) -> Result<(), AllocError> {
        const { assert!(CAP != 0, "buffer capacity must be non-zero") };

        if self.ptr.is_some() {
            return Ok(());
        }

        let layout = Self::layout()?;
        // SAFETY: `layout` has a non-zero size: CAP != 0 and code units are not
        // zero-sized.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw.cast::<T>()).ok_or(AllocError {
            bytes: layout.size(),
            align: layout.align(),
        })?;

        self.ptr = Some(ptr);
        self.current = 0;
        self.end = 0;
        Ok(())
    }

    /// Free the allocation and return to the cold state.
    ///
    /// Safe to call repeatedly. Any buffered units are discarded.
    pub fn release(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            if let Ok(layout) = Self::layout() {
                // SAFETY: `ptr` came from `alloc_zeroed` with this same layout
                // and ownership was just taken out of `self.ptr`.
                unsafe { dealloc(ptr.as_ptr().cast::<u8>(), layout) };
            }
        }
        self.current = 0;
        self.end = 0;
    }

    /// Whether the buffer has been allocated.
    #[inline]
    pub const fn is_allocated(&self) -> bool {
        self.ptr.is_some()
    }

    /// The `current` cursor.
    #[inline]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// The `end` cursor.
    #[inline]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Move the `current` cursor.
    ///
    /// # Panics
    ///
    /// Panics if `pos > end`.
    #[inline]
    pub fn set_current(&mut self, pos: usize) {
        assert!(pos <= self.end, "current cursor {} past end {}", pos, self.end);
        self.current = pos;
    }

    /// Move the `end` cursor.
    ///
    /// # Panics
    ///
    /// Panics if the storage is cold and `pos != 0`, if `pos > CAP`, or if
    /// `pos < current`.
    #[inline]
    pub fn set_end(&mut self, pos: usize) {
        let limit = if self.is_allocated() { CAP } else { 0 };
        assert!(pos <= limit, "end cursor {} past limit {}", pos, limit);
        assert!(pos >= self.current, "end cursor {} before current {}", pos, self.current);
        self.end = pos;
    }

    /// Advance `current` by `n`.
    ///
    /// # Panics
    ///
    /// Panics if this would move `current` past `end`.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.set_current(self.current + n);
    }

    /// Reset both cursors to `begin`, leaving the allocation in place.
    #[inline]
    pub fn reset(&mut self) {
        self.current = 0;
        self.end = 0;
    }

    /// The whole allocation, `[begin, begin + CAP)`. Empty when cold.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match self.ptr {
            // SAFETY: allocated with room for CAP zero-initialised units, which
            // `CodeUnit` guarantees are valid.
            Some(ptr) => unsafe { slice::from_raw_parts(ptr.as_ptr(), CAP) },
            None => &[],
        }
    }

    /// The whole allocation, mutably. Empty when cold.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.ptr {
            // SAFETY: as in `as_slice`; `&mut self` guarantees exclusivity.
            Some(ptr) => unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), CAP) },
            None => &mut [],
        }
    }

    /// `[begin, end)`.
    #[inline]
    pub fn filled(&self) -> &[T] {
        &self.as_slice()[..self.end]
    }

    /// `[current, end)`: fetched but not yet consumed (input view).
    #[inline]
    pub fn unread(&self) -> &[T] {
        &self.as_slice()[self.current..self.end]
    }

    /// `[begin, current)`: written but not yet flushed (output view).
    #[inline]
    pub fn pending(&self) -> &[T] {
        &self.as_slice()[..self.current]
    }

    /// `[current, end)`, mutably: room left for writing (output view).
    #[inline]
    pub fn spare_mut(&mut self) -> &mut [T] {
        let (current, end) = (self.current, self.end);
        &mut self.as_mut_slice()[current..end]
    }
}

impl<T: CodeUnit, const CAP: usize, A: Alignment> Default for BufferStorage<T, CAP, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CodeUnit, const CAP: usize, A: Alignment> Drop for BufferStorage<T, CAP, A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: CodeUnit, const CAP: usize, A: Alignment> fmt::Debug for BufferStorage<T, CAP, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferStorage")
            .field("capacity", &CAP)
            .field("allocated", &self.is_allocated())
            .field("current", &self.current)
            .field("end", &self.end)
            .finish()
    }
}
