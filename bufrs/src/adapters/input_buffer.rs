//! Input buffer adapter.

use crate::domain::{
    entities::{BufferStorage, TransferStats},
    error::BufError,
    ports::{
        BufferedInput, Handle, MemoryMapIn, NativeRead, NativeSeek, NativeWrite, SeekFrom,
        ZeroCopyIn, ZeroCopyOut,
    },
    transfer,
    value_objects::{CodeUnit, DEFAULT_CAPACITY},
};
use aligned::{Alignment, A64};

/// Buffered reader over a native input handle.
///
/// Reads are served from an owned, aligned buffer of `CAP` units that is
/// refilled with one bulk handle read on a miss. Requests of at least one
/// capacity bypass the buffer. The buffer is only allocated once a read
/// actually needs it.
///
/// The adapter is itself a handle: it implements every port the wrapped
/// handle implements, buffering reads and seeks and forwarding the rest.
///
/// # Type Parameters
///
/// - `H`: The native handle
/// - `CAP`: Buffer capacity in code units
/// - `A`: Buffer alignment marker
///
/// # Examples
///
/// ```
/// use bufrs::{InputBuffer, MemoryHandle};
///
/// let mut input = InputBuffer::<_, 8>::new(MemoryHandle::new(b"abcdef".to_vec()));
///
/// let mut buf = [0u8; 2];
/// input.read(&mut buf).unwrap();
/// assert_eq!(&buf, b"ab");
/// assert_eq!(input.unread(), b"cdef");
/// ```
pub struct InputBuffer<H: Handle, const CAP: usize = DEFAULT_CAPACITY, A: Alignment = A64> {
    handle: H,
    buffer: BufferStorage<H::Unit, CAP, A>,
    stats: TransferStats,
}

impl<H: Handle, const CAP: usize, A: Alignment> InputBuffer<H, CAP, A> {
    /// Wrap `handle`. Nothing is allocated until the first read.
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            buffer: BufferStorage::new(),
            stats: TransferStats::default(),
        }
    }

    /// Buffer capacity in code units.
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Whether the buffer has been allocated.
    pub fn is_allocated(&self) -> bool {
        self.buffer.is_allocated()
    }

    /// The valid region of the buffer, `[begin, end)`.
    pub fn buffer(&self) -> &[H::Unit] {
        self.buffer.filled()
    }

    /// Units fetched from the handle but not consumed yet.
    pub fn unread(&self) -> &[H::Unit] {
        self.buffer.unread()
    }

    /// Position of the read cursor within [`buffer`](Self::buffer).
    pub fn cursor(&self) -> usize {
        self.buffer.current()
    }

    /// Move the read cursor within the valid region.
    ///
    /// Moving it backwards re-exposes units that were already consumed.
    ///
    /// # Errors
    ///
    /// Returns [`BufError::CursorOutOfRange`] if `pos` is past the valid
    /// region.
    pub fn set_cursor(&mut self, pos: usize) -> Result<(), BufError<H::Error>> {
        if pos > self.buffer.end() {
            return Err(BufError::CursorOutOfRange {
                requested: pos,
                limit: self.buffer.end(),
            });
        }
        self.buffer.set_current(pos);
        Ok(())
    }

    /// Consume `n` unread units. `n` is clamped to what is buffered.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.buffer.unread().len());
        self.buffer.advance(n);
    }

    /// Transfer statistics so far.
    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    /// Borrow the wrapped handle.
    pub fn get_ref(&self) -> &H {
        &self.handle
    }

    /// Borrow the wrapped handle mutably.
    ///
    /// Reading from it directly skips whatever is still buffered.
    pub fn get_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    /// Unwrap the handle. Buffered units are discarded.
    pub fn into_inner(self) -> H {
        self.handle
    }
}

impl<H: NativeRead, const CAP: usize, A: Alignment> InputBuffer<H, CAP, A> {
    /// Read into `dst`, returning the number of units produced.
    ///
    /// The count is short only at end-of-stream; afterwards reads return 0.
    ///
    /// # Errors
    ///
    /// Returns [`BufError::Alloc`] if the buffer cannot be allocated, or
    /// [`BufError::Io`] if the handle fails.
    #[inline]
    pub fn read(&mut self, dst: &mut [H::Unit]) -> Result<usize, BufError<H::Error>> {
        transfer::read(&mut self.buffer, &mut self.handle, &mut self.stats, dst)
    }

    /// Refill the buffer if it is exhausted.
    ///
    /// Returns `false` once the stream has ended and nothing is buffered.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn fill(&mut self) -> Result<bool, BufError<H::Error>> {
        transfer::fill(&mut self.buffer, &mut self.handle, &mut self.stats)
    }
}

impl<H, const CAP: usize, A> InputBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8>,
    A: Alignment,
{
    /// Read raw bytes straight into a slice of wider units.
    ///
    /// Returns the number of **bytes** produced. A count that is not a
    /// multiple of `size_of::<U>()` means the stream ended mid-unit.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_units<U: CodeUnit>(&mut self, dst: &mut [U]) -> Result<usize, BufError<H::Error>> {
        self.read(transfer::units_as_bytes_mut(dst))
    }
}

impl<H: NativeSeek, const CAP: usize, A: Alignment> InputBuffer<H, CAP, A> {
    /// Seek the handle and drop whatever is buffered.
    ///
    /// A relative offset is taken from the logical position, i.e. the last
    /// unit handed to the caller, not from where the handle stands.
    ///
    /// # Errors
    ///
    /// Returns [`BufError::InvalidSeek`] if the corrected offset overflows,
    /// or [`BufError::Io`] if the handle rejects the seek.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, BufError<H::Error>> {
        transfer::seek_input(&mut self.buffer, &mut self.handle, pos)
    }
}

impl<H: Handle, const CAP: usize, A: Alignment> Handle for InputBuffer<H, CAP, A> {
    type Unit = H::Unit;
    type Error = BufError<H::Error>;
}

impl<H: NativeRead, const CAP: usize, A: Alignment> NativeRead for InputBuffer<H, CAP, A> {
    #[inline]
    fn read(&mut self, dst: &mut [H::Unit]) -> Result<usize, Self::Error> {
        InputBuffer::read(self, dst)
    }
}

impl<H: NativeRead, const CAP: usize, A: Alignment> BufferedInput for InputBuffer<H, CAP, A> {
    fn fill(&mut self) -> Result<bool, Self::Error> {
        InputBuffer::fill(self)
    }

    fn unread(&self) -> &[H::Unit] {
        InputBuffer::unread(self)
    }

    fn consume(&mut self, n: usize) {
        InputBuffer::consume(self, n)
    }
}

impl<H: NativeWrite, const CAP: usize, A: Alignment> NativeWrite for InputBuffer<H, CAP, A> {
    fn write(&mut self, src: &[H::Unit]) -> Result<usize, Self::Error> {
        self.handle.write(src).map_err(BufError::Io)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.handle.flush().map_err(BufError::Io)
    }
}

impl<H: NativeSeek, const CAP: usize, A: Alignment> NativeSeek for InputBuffer<H, CAP, A> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        InputBuffer::seek(self, pos)
    }
}

impl<H: Handle + ZeroCopyIn, const CAP: usize, A: Alignment> ZeroCopyIn for InputBuffer<H, CAP, A> {
    type Raw = H::Raw;

    fn zero_copy_in_handle(&self) -> H::Raw {
        self.handle.zero_copy_in_handle()
    }
}

impl<H: Handle + ZeroCopyOut, const CAP: usize, A: Alignment> ZeroCopyOut
    for InputBuffer<H, CAP, A>
{
    type Raw = H::Raw;

    fn zero_copy_out_handle(&self) -> H::Raw {
        self.handle.zero_copy_out_handle()
    }
}

impl<H: MemoryMapIn, const CAP: usize, A: Alignment> MemoryMapIn for InputBuffer<H, CAP, A> {
    fn memory_map_in(&self) -> &[H::Unit] {
        self.handle.memory_map_in()
    }
}

impl<H, const CAP: usize, A> core::fmt::Debug for InputBuffer<H, CAP, A>
where
    H: Handle + core::fmt::Debug,
    A: Alignment,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InputBuffer")
            .field("handle", &self.handle)
            .field("buffer", &self.buffer)
            .finish()
    }
}
