//! Output buffer adapter.

use crate::domain::{
    entities::{BufferStorage, TransferStats},
    error::{BufError, IntoInnerError},
    ports::{
        BufferedInput, Handle, MemoryMapIn, NativeRead, NativeSeek, NativeWrite, SeekFrom,
        ZeroCopyIn, ZeroCopyOut,
    },
    transfer,
    value_objects::{CodeUnit, DEFAULT_CAPACITY},
};
use aligned::{Alignment, A64};
use core::{mem::ManuallyDrop, ptr};

/// Buffered writer over a native output handle.
///
/// Writes are collected in an owned, aligned buffer of `CAP` units and sent
/// to the handle in bulk when the buffer overflows, on [`flush`], and when
/// the adapter is dropped. Writes of at least one capacity that find the
/// buffer empty go straight to the handle.
///
/// # Short writes
///
/// By default a short handle write is taken at face value and the buffer is
/// considered delivered. [`with_full_retry`] makes the adapter keep every
/// unit: unwritten tails stay buffered and are re-sent, and a handle write
/// that accepts nothing fails with [`BufError::WriteZero`].
///
/// # Drop
///
/// Dropping the adapter flushes it, but a failure at that point can only be
/// logged. Call [`flush`] or [`into_inner`] when delivery matters.
///
/// [`flush`]: Self::flush
/// [`into_inner`]: Self::into_inner
/// [`with_full_retry`]: Self::with_full_retry
///
/// # Examples
///
/// ```
/// use bufrs::{MemoryHandle, OutputBuffer};
///
/// let mut output = OutputBuffer::<_, 8>::new(MemoryHandle::empty());
/// output.write(b"hello").unwrap();
/// assert_eq!(output.pending(), b"hello");
///
/// let handle = output.into_inner().unwrap();
/// assert_eq!(handle.as_slice(), b"hello");
/// ```
pub struct OutputBuffer<H: NativeWrite, const CAP: usize = DEFAULT_CAPACITY, A: Alignment = A64> {
    handle: H,
    buffer: BufferStorage<H::Unit, CAP, A>,
    stats: TransferStats,
    full_retry: bool,
}

impl<H: NativeWrite, const CAP: usize, A: Alignment> OutputBuffer<H, CAP, A> {
    /// Wrap `handle`. Nothing is allocated until the first buffered write.
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            buffer: BufferStorage::new(),
            stats: TransferStats::default(),
            full_retry: false,
        }
    }

    /// Wrap `handle`, never dropping units on a short handle write.
    pub fn with_full_retry(handle: H) -> Self {
        let mut output = Self::new(handle);
        output.full_retry = true;
        output
    }

    /// Whether short handle writes are retried.
    pub fn full_retry(&self) -> bool {
        self.full_retry
    }

    /// Buffer capacity in code units.
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Whether the buffer has been allocated.
    pub fn is_allocated(&self) -> bool {
        self.buffer.is_allocated()
    }

    /// Write all of `src`.
    ///
    /// # Errors
    ///
    /// Returns [`BufError::Alloc`] if the buffer cannot be allocated,
    /// [`BufError::Io`] if a flush or passthrough write fails, or
    /// [`BufError::WriteZero`] in full-retry mode when the handle stops
    /// accepting units. Units that were buffered before the error stay
    /// buffered.
    #[inline]
    pub fn write(&mut self, src: &[H::Unit]) -> Result<(), BufError<H::Error>> {
        transfer::write(
            &mut self.buffer,
            &mut self.handle,
            &mut self.stats,
            self.full_retry,
            src,
        )
    }

    /// Append a single unit.
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write).
    #[inline]
    pub fn put(&mut self, unit: H::Unit) -> Result<(), BufError<H::Error>> {
        transfer::put(
            &mut self.buffer,
            &mut self.handle,
            &mut self.stats,
            self.full_retry,
            unit,
        )
    }

    /// Send everything buffered to the handle.
    ///
    /// A no-op when nothing is buffered, so flushing twice costs one handle
    /// write at most.
    ///
    /// # Errors
    ///
    /// Returns [`BufError::Io`] if the handle fails, or
    /// [`BufError::WriteZero`] in full-retry mode when it stops accepting
    /// units.
    pub fn flush(&mut self) -> Result<(), BufError<H::Error>> {
        transfer::flush(
            &mut self.buffer,
            &mut self.handle,
            &mut self.stats,
            self.full_retry,
        )
    }

    /// Flush the buffer, then ask the handle to flush its own caches.
    ///
    /// # Errors
    ///
    /// Same as [`flush`](Self::flush).
    pub fn sync(&mut self) -> Result<(), BufError<H::Error>> {
        self.flush()?;
        self.handle.flush().map_err(BufError::Io)
    }

    /// Units written but not flushed yet.
    pub fn pending(&self) -> &[H::Unit] {
        self.buffer.pending()
    }

    /// Free space in the buffer for writing in place.
    ///
    /// Allocates the buffer if it is cold and flushes it if it is full, so
    /// the returned slice is never empty. Follow up with
    /// [`commit`](Self::commit).
    ///
    /// # Errors
    ///
    /// Same as [`flush`](Self::flush), plus [`BufError::Alloc`].
    pub fn spare_mut(&mut self) -> Result<&mut [H::Unit], BufError<H::Error>> {
        transfer::reserve(
            &mut self.buffer,
            &mut self.handle,
            &mut self.stats,
            self.full_retry,
        )?;
        Ok(self.buffer.spare_mut())
    }

    /// Mark `n` units written through [`spare_mut`](Self::spare_mut) as
    /// pending.
    ///
    /// # Errors
    ///
    /// Returns [`BufError::CursorOutOfRange`] if fewer than `n` units of
    /// space are left.
    pub fn commit(&mut self, n: usize) -> Result<(), BufError<H::Error>> {
        let requested = self.buffer.current().saturating_add(n);
        if requested > self.buffer.end() {
            return Err(BufError::CursorOutOfRange {
                requested,
                limit: self.buffer.end(),
            });
        }
        self.buffer.advance(n);
        Ok(())
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
    /// Writing to it directly bypasses whatever is still buffered.
    pub fn get_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    /// Flush and unwrap the handle.
    ///
    /// # Errors
    ///
    /// If the flush fails the adapter is handed back inside the error with
    /// its unsent units intact.
    pub fn into_inner(mut self) -> Result<H, IntoInnerError<Self, H::Error>> {
        if let Err(e) = self.flush() {
            return Err(IntoInnerError::new(self, e));
        }

        let mut this = ManuallyDrop::new(self);
        this.buffer.release();
        // SAFETY: `this` is never dropped or used again, so the handle is
        // moved out exactly once. The storage was released above and the
        // remaining fields own nothing.
        Ok(unsafe { ptr::read(&this.handle) })
    }
}

impl<H, const CAP: usize, A> OutputBuffer<H, CAP, A>
where
    H: NativeWrite<Unit = u8>,
    A: Alignment,
{
    /// Write a slice of wider units as their raw bytes.
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write).
    pub fn write_units<U: CodeUnit>(&mut self, src: &[U]) -> Result<(), BufError<H::Error>> {
        self.write(transfer::units_as_bytes(src))
    }
}

impl<H: NativeWrite + NativeSeek, const CAP: usize, A: Alignment> OutputBuffer<H, CAP, A> {
    /// Flush, then seek the handle.
    ///
    /// # Errors
    ///
    /// Same as [`flush`](Self::flush), or [`BufError::Io`] if the handle
    /// rejects the seek.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, BufError<H::Error>> {
        transfer::seek_output(
            &mut self.buffer,
            &mut self.handle,
            &mut self.stats,
            self.full_retry,
            pos,
        )
    }
}

impl<H: NativeWrite, const CAP: usize, A: Alignment> Drop for OutputBuffer<H, CAP, A> {
    fn drop(&mut self) {
        if self.buffer.current() == 0 {
            return;
        }
        if self.flush().is_err() {
            warn!(
                "implicit flush on drop failed, {} buffered units lost",
                self.buffer.current()
            );
        }
    }
}

impl<H: NativeWrite, const CAP: usize, A: Alignment> Handle for OutputBuffer<H, CAP, A> {
    type Unit = H::Unit;
    type Error = BufError<H::Error>;
}

impl<H: NativeWrite, const CAP: usize, A: Alignment> NativeWrite for OutputBuffer<H, CAP, A> {
    /// Buffers all of `src`; the count is always `src.len()`.
    #[inline]
    fn write(&mut self, src: &[H::Unit]) -> Result<usize, Self::Error> {
        OutputBuffer::write(self, src)?;
        Ok(src.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.sync()
    }
}

impl<H, const CAP: usize, A> NativeRead for OutputBuffer<H, CAP, A>
where
    H: NativeWrite + NativeRead,
    A: Alignment,
{
    #[inline]
    fn read(&mut self, dst: &mut [H::Unit]) -> Result<usize, Self::Error> {
        self.handle.read(dst).map_err(BufError::Io)
    }
}

impl<H, const CAP: usize, A> BufferedInput for OutputBuffer<H, CAP, A>
where
    H: NativeWrite + BufferedInput,
    A: Alignment,
{
    fn fill(&mut self) -> Result<bool, Self::Error> {
        self.handle.fill().map_err(BufError::Io)
    }

    fn unread(&self) -> &[H::Unit] {
        self.handle.unread()
    }

    fn consume(&mut self, n: usize) {
        self.handle.consume(n)
    }
}

impl<H, const CAP: usize, A> NativeSeek for OutputBuffer<H, CAP, A>
where
    H: NativeWrite + NativeSeek,
    A: Alignment,
{
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        OutputBuffer::seek(self, pos)
    }
}

impl<H: NativeWrite + ZeroCopyIn, const CAP: usize, A: Alignment> ZeroCopyIn
    for OutputBuffer<H, CAP, A>
{
    type Raw = H::Raw;

    fn zero_copy_in_handle(&self) -> H::Raw {
        self.handle.zero_copy_in_handle()
    }
}

impl<H: NativeWrite + ZeroCopyOut, const CAP: usize, A: Alignment> ZeroCopyOut
    for OutputBuffer<H, CAP, A>
{
    type Raw = H::Raw;

    fn zero_copy_out_handle(&self) -> H::Raw {
        self.handle.zero_copy_out_handle()
    }
}

impl<H: NativeWrite + MemoryMapIn, const CAP: usize, A: Alignment> MemoryMapIn
    for OutputBuffer<H, CAP, A>
{
    fn memory_map_in(&self) -> &[H::Unit] {
        self.handle.memory_map_in()
    }
}

impl<H, const CAP: usize, A> core::fmt::Debug for OutputBuffer<H, CAP, A>
where
    H: NativeWrite + core::fmt::Debug,
    A: Alignment,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("handle", &self.handle)
            .field("buffer", &self.buffer)
            .field("full_retry", &self.full_retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{MemoryError, MemoryHandle};

    // Fails every write once `armed` is set.
    #[derive(Debug, Default)]
    struct Failing {
        armed: bool,
        written: Vec<u8>,
    }

    impl Handle for Failing {
        type Unit = u8;
        type Error = &'static str;
    }

    impl NativeWrite for Failing {
        fn write(&mut self, src: &[u8]) -> Result<usize, &'static str> {
            if self.armed {
                return Err("device gone");
            }
            self.written.extend_from_slice(src);
            Ok(src.len())
        }
    }

    #[test]
    fn test_flush_twice_is_one_handle_write() {
        let mut output = OutputBuffer::<_, 16>::new(MemoryHandle::empty());
        output.write(b"abc").unwrap();
        output.flush().unwrap();
        output.flush().unwrap();

        assert_eq!(output.stats().handle_writes, 1);
        assert_eq!(output.get_ref().as_slice(), b"abc");
    }

    #[test]
    fn test_cold_passthrough_allocates_nothing() {
        let mut output = OutputBuffer::<_, 4>::new(MemoryHandle::empty());
        output.write(b"abcdef").unwrap();

        assert!(!output.is_allocated());
        assert_eq!(output.stats().handle_writes, 1);
        assert_eq!(output.stats().passthrough_writes, 1);
        assert_eq!(output.get_ref().as_slice(), b"abcdef");
    }

    #[test]
    fn test_short_writes_lose_units_without_retry() {
        let handle = MemoryHandle::empty().with_write_limit(2);
        let mut output = OutputBuffer::<_, 8>::new(handle);
        output.write(b"abcde").unwrap();
        output.flush().unwrap();

        assert_eq!(output.get_ref().as_slice(), b"ab");
        assert!(output.pending().is_empty());
    }

    #[test]
    fn test_short_writes_retried_in_full_retry_mode() {
        let handle = MemoryHandle::empty().with_write_limit(2);
        let mut output = OutputBuffer::<_, 4>::with_full_retry(handle);
        output.write(b"abcdefghij").unwrap();
        output.write(b"kl").unwrap();

        let handle = output.into_inner().unwrap();
        assert_eq!(handle.as_slice(), b"abcdefghijkl");
    }

    #[test]
    fn test_write_zero_in_full_retry_mode() {
        let handle = MemoryHandle::empty().with_write_limit(0);
        let mut output = OutputBuffer::<_, 8>::with_full_retry(handle);
        output.write(b"abc").unwrap();

        assert!(matches!(output.flush(), Err(BufError::WriteZero)));
        assert_eq!(output.pending(), b"abc");
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_flush_past_addressable_end_is_an_error() {
        let mut output = OutputBuffer::<_, 8>::new(MemoryHandle::empty());
        output.seek(SeekFrom::Start(u64::MAX)).unwrap();
        output.write(b"x").unwrap();

        assert!(matches!(
            output.flush(),
            Err(BufError::Io(MemoryError::OutOfRange))
        ));
        assert!(output.get_ref().as_slice().is_empty());
    }

    #[test]
    fn test_drop_flushes_pending_units() {
        let mut handle = MemoryHandle::empty();
        {
            let mut output = OutputBuffer::<_, 16>::new(&mut handle);
            output.write(b"kept").unwrap();
        }
        assert_eq!(handle.as_slice(), b"kept");
    }

    #[test]
    fn test_drop_suppresses_flush_failure() {
        let mut handle = Failing::default();
        {
            let mut output = OutputBuffer::<_, 16>::new(&mut handle);
            output.write(b"lost").unwrap();
            output.get_mut().armed = true;
        }
        assert!(handle.written.is_empty());
    }

    #[test]
    fn test_into_inner_returns_adapter_on_failure() {
        let mut output = OutputBuffer::<_, 16>::new(Failing::default());
        output.write(b"xyz").unwrap();
        output.get_mut().armed = true;

        let err = output.into_inner().unwrap_err();
        assert!(matches!(err.error(), BufError::Io("device gone")));

        let mut output = err.into_inner();
        assert_eq!(output.pending(), b"xyz");
        output.get_mut().armed = false;
        assert_eq!(output.into_inner().unwrap().written, b"xyz");
    }

    #[test]
    fn test_put_scenario() {
        let mut output = OutputBuffer::<_, 8>::new(MemoryHandle::empty());
        for &b in b"ABCDEFGHIJKLMNOPQRST" {
            output.put(b).unwrap();
        }
        let handle = output.into_inner().unwrap();
        assert_eq!(handle.as_slice(), b"ABCDEFGHIJKLMNOPQRST");
    }

    #[test]
    fn test_reserve_and_commit() {
        let mut output = OutputBuffer::<_, 4>::new(MemoryHandle::empty());
        let spare = output.spare_mut().unwrap();
        assert_eq!(spare.len(), 4);
        spare[..3].copy_from_slice(b"abc");
        output.commit(3).unwrap();
        assert_eq!(output.pending(), b"abc");

        let err = output.commit(2).unwrap_err();
        assert!(matches!(err, BufError::CursorOutOfRange { requested: 5, limit: 4 }));
    }

    #[test]
    fn test_seek_flushes_first() {
        let mut output = OutputBuffer::<_, 16>::new(MemoryHandle::new(b"........".to_vec()));
        output.write(b"ab").unwrap();
        output.seek(SeekFrom::Start(6)).unwrap();
        output.write(b"yz").unwrap();

        let handle = output.into_inner().unwrap();
        assert_eq!(handle.as_slice(), b"ab....yz");
    }

    #[test]
    fn test_write_units() {
        let mut output = OutputBuffer::<_, 16>::new(MemoryHandle::empty());
        output.write_units(&[0x0102_0304u32]).unwrap();
        assert_eq!(output.pending(), &0x0102_0304u32.to_ne_bytes());
    }
}
