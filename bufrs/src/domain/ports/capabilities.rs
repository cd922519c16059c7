//! Optional handle capabilities.
//!
//! Buffered adapters implement these exactly when the handle they wrap does,
//! so a caller holding an adapter can still reach the raw descriptor or a
//! memory-mapped view without unwrapping it.

use super::Handle;

/// Access to the raw input descriptor for zero-copy transfers.
pub trait ZeroCopyIn {
    /// The raw descriptor type (e.g. `RawFd`).
    type Raw;

    /// The descriptor data can be read from without going through the buffer.
    fn zero_copy_in_handle(&self) -> Self::Raw;
}

/// Access to the raw output descriptor for zero-copy transfers.
pub trait ZeroCopyOut {
    /// The raw descriptor type (e.g. `RawFd`).
    type Raw;

    /// The descriptor data can be written to without going through the buffer.
    fn zero_copy_out_handle(&self) -> Self::Raw;
}

/// A handle whose whole contents are addressable in memory.
pub trait MemoryMapIn: Handle {
    /// The mapped contents.
    fn memory_map_in(&self) -> &[Self::Unit];
}

/// Input that exposes its buffer to scanning helpers.
///
/// This is the cursor contract the text-scanning helpers in
/// [`crate::infrastructure::scan`] are written against: inspect the unread
/// units, consume some of them, refill when exhausted.
pub trait BufferedInput: Handle {
    /// Refill the buffer if it is exhausted.
    ///
    /// Returns `false` once the stream has ended and nothing is buffered.
    ///
    /// # Errors
    ///
    /// Returns an error if the refill fails.
    fn fill(&mut self) -> Result<bool, Self::Error>;

    /// Units fetched but not consumed yet.
    fn unread(&self) -> &[Self::Unit];

    /// Mark `n` unread units as consumed.
    ///
    /// `n` is clamped to the number of unread units.
    fn consume(&mut self, n: usize);
}
