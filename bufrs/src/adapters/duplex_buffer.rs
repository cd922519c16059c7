//! Duplex buffer adapter.

use crate::{
    adapters::{InputBuffer, OutputBuffer},
    domain::{
        entities::TransferStats,
        error::{BufError, IntoInnerError},
        ports::{BufferedInput, Handle, NativeRead, NativeSeek, NativeWrite, SeekFrom},
        value_objects::DEFAULT_CAPACITY,
    },
};
use aligned::{Alignment, A64};

/// Buffered reader and writer over one bidirectional handle.
///
/// An [`OutputBuffer`] whose handle is an [`InputBuffer`]: each direction
/// has its own buffer of `CAP` units. Reads do not flush pending writes; call
/// [`flush`](Self::flush) first when the two directions share a position.
///
/// Writes do not see the read-ahead either. After a read the handle sits at
/// the end of what was fetched, not at the logical position, so a write
/// lands past the unread units. Call [`seek`](Self::seek) with
/// `SeekFrom::Current(0)` before writing after a read.
///
/// Errors from both layers come out as one `BufError<H::Error>`.
pub struct DuplexBuffer<H, const CAP: usize = DEFAULT_CAPACITY, A: Alignment = A64>
where
    H: NativeRead + NativeWrite,
{
    inner: OutputBuffer<InputBuffer<H, CAP, A>, CAP, A>,
}

impl<H, const CAP: usize, A> DuplexBuffer<H, CAP, A>
where
    H: NativeRead + NativeWrite,
    A: Alignment,
{
    /// Wrap `handle`. Neither buffer is allocated until first use.
    pub fn new(handle: H) -> Self {
        Self {
            inner: OutputBuffer::new(InputBuffer::new(handle)),
        }
    }

    /// Wrap `handle`, retrying short writes on the output side.
    pub fn with_full_retry(handle: H) -> Self {
        Self {
            inner: OutputBuffer::with_full_retry(InputBuffer::new(handle)),
        }
    }

    /// Read into `dst`. See [`InputBuffer::read`].
    #[inline]
    pub fn read(&mut self, dst: &mut [H::Unit]) -> Result<usize, BufError<H::Error>> {
        self.inner.get_mut().read(dst)
    }

    /// Refill the input buffer if it is exhausted. See [`InputBuffer::fill`].
    pub fn fill(&mut self) -> Result<bool, BufError<H::Error>> {
        self.inner.get_mut().fill()
    }

    /// Units fetched but not consumed yet.
    pub fn unread(&self) -> &[H::Unit] {
        self.inner.get_ref().unread()
    }

    /// Consume `n` unread units, clamped.
    pub fn consume(&mut self, n: usize) {
        self.inner.get_mut().consume(n)
    }

    /// Write all of `src`. See [`OutputBuffer::write`].
    #[inline]
    pub fn write(&mut self, src: &[H::Unit]) -> Result<(), BufError<H::Error>> {
        self.inner.write(src).map_err(BufError::flatten)
    }

    /// Append one unit. See [`OutputBuffer::put`].
    #[inline]
    pub fn put(&mut self, unit: H::Unit) -> Result<(), BufError<H::Error>> {
        self.inner.put(unit).map_err(BufError::flatten)
    }

    /// Send pending units to the handle.
    pub fn flush(&mut self) -> Result<(), BufError<H::Error>> {
        self.inner.flush().map_err(BufError::flatten)
    }

    /// Flush, then flush the handle's own caches.
    pub fn sync(&mut self) -> Result<(), BufError<H::Error>> {
        self.inner.sync().map_err(BufError::flatten)
    }

    /// Units written but not flushed yet.
    pub fn pending(&self) -> &[H::Unit] {
        self.inner.pending()
    }

    /// Statistics of the input side.
    pub fn input_stats(&self) -> TransferStats {
        self.inner.get_ref().stats()
    }

    /// Statistics of the output side.
    pub fn output_stats(&self) -> TransferStats {
        self.inner.stats()
    }

    /// Borrow the wrapped handle.
    pub fn get_ref(&self) -> &H {
        self.inner.get_ref().get_ref()
    }

    /// Borrow the wrapped handle mutably.
    pub fn get_mut(&mut self) -> &mut H {
        self.inner.get_mut().get_mut()
    }

    /// Flush and unwrap the handle. Unread input is discarded.
    ///
    /// # Errors
    ///
    /// If the flush fails the adapter is handed back inside the error.
    pub fn into_inner(self) -> Result<H, IntoInnerError<Self, H::Error>> {
        match self.inner.into_inner() {
            Ok(input) => Ok(input.into_inner()),
            Err(err) => {
                let (inner, error) = err.into_parts();
                Err(IntoInnerError::new(Self { inner }, error.flatten()))
            }
        }
    }
}

impl<H, const CAP: usize, A> DuplexBuffer<H, CAP, A>
where
    H: NativeRead + NativeWrite + NativeSeek,
    A: Alignment,
{
    /// Flush pending output, drop buffered input, then seek.
    ///
    /// Relative offsets are corrected for unread input units.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, BufError<H::Error>> {
        self.inner.seek(pos).map_err(BufError::flatten)
    }
}

impl<H: NativeRead + NativeWrite, const CAP: usize, A: Alignment> Handle
    for DuplexBuffer<H, CAP, A>
{
    type Unit = H::Unit;
    type Error = BufError<H::Error>;
}

impl<H: NativeRead + NativeWrite, const CAP: usize, A: Alignment> NativeRead
    for DuplexBuffer<H, CAP, A>
{
    #[inline]
    fn read(&mut self, dst: &mut [H::Unit]) -> Result<usize, Self::Error> {
        DuplexBuffer::read(self, dst)
    }
}

impl<H: NativeRead + NativeWrite, const CAP: usize, A: Alignment> NativeWrite
    for DuplexBuffer<H, CAP, A>
{
    #[inline]
    fn write(&mut self, src: &[H::Unit]) -> Result<usize, Self::Error> {
        DuplexBuffer::write(self, src)?;
        Ok(src.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.sync()
    }
}

impl<H: NativeRead + NativeWrite, const CAP: usize, A: Alignment> BufferedInput
    for DuplexBuffer<H, CAP, A>
{
    fn fill(&mut self) -> Result<bool, Self::Error> {
        DuplexBuffer::fill(self)
    }

    fn unread(&self) -> &[H::Unit] {
        DuplexBuffer::unread(self)
    }

    fn consume(&mut self, n: usize) {
        DuplexBuffer::consume(self, n)
    }
}

impl<H, const CAP: usize, A> NativeSeek for DuplexBuffer<H, CAP, A>
where
    H: NativeRead + NativeWrite + NativeSeek,
    A: Alignment,
{
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        DuplexBuffer::seek(self, pos)
    }
}

impl<H, const CAP: usize, A> core::fmt::Debug for DuplexBuffer<H, CAP, A>
where
    H: NativeRead + NativeWrite + core::fmt::Debug,
    A: Alignment,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DuplexBuffer").field("inner", &self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryHandle;

    #[test]
    fn test_each_direction_has_its_own_buffer() {
        let mut duplex = DuplexBuffer::<_, 8>::new(MemoryHandle::new(b"0123456789".to_vec()));

        let mut buf = [0u8; 2];
        duplex.read(&mut buf).unwrap();
        assert_eq!(&buf, b"01");

        duplex.write(b"ab").unwrap();
        assert_eq!(duplex.pending(), b"ab");
        assert_eq!(duplex.unread(), b"234567");

        assert_eq!(duplex.input_stats().handle_reads, 1);
        assert_eq!(duplex.output_stats().handle_writes, 0);
    }

    #[test]
    fn test_seek_flushes_output_and_invalidates_input() {
        let mut duplex = DuplexBuffer::<_, 4>::new(MemoryHandle::new(b"abcdefgh".to_vec()));

        let mut buf = [0u8; 1];
        duplex.read(&mut buf).unwrap();
        assert_eq!(duplex.seek(SeekFrom::Current(0)).unwrap(), 1);
        assert!(duplex.unread().is_empty());

        duplex.write(b"XY").unwrap();
        duplex.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(duplex.get_ref().as_slice(), b"aXYdefgh");

        let mut all = [0u8; 8];
        assert_eq!(duplex.read(&mut all).unwrap(), 8);
        assert_eq!(&all, b"aXYdefgh");
    }

    #[test]
    fn test_write_after_read_needs_seek() {
        let mut duplex = DuplexBuffer::<_, 8>::new(MemoryHandle::new(b"hello world!".to_vec()));
        let mut word = [0u8; 5];
        duplex.read(&mut word).unwrap();

        // The handle is at the read-ahead position until the seek.
        assert_eq!(duplex.get_ref().position(), 8);
        assert_eq!(duplex.seek(SeekFrom::Current(0)).unwrap(), 5);

        duplex.write(b"_").unwrap();
        duplex.flush().unwrap();
        assert_eq!(duplex.get_ref().as_slice(), b"hello_world!");
    }

    #[test]
    fn test_into_inner_flushes() {
        let mut duplex = DuplexBuffer::<_, 16>::new(MemoryHandle::empty());
        duplex.write(b"out").unwrap();
        let handle = duplex.into_inner().unwrap();
        assert_eq!(handle.as_slice(), b"out");
    }

    #[test]
    fn test_write_zero_is_flattened() {
        let mut duplex =
            DuplexBuffer::<_, 4>::with_full_retry(MemoryHandle::empty().with_write_limit(0));
        duplex.write(b"ab").unwrap();
        assert!(matches!(duplex.flush(), Err(BufError::WriteZero)));
    }
}
