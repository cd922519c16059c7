//! Implementations of blocking `embedded_io` traits.
//!
//! [`FromEmbeddedIo`] turns an `embedded_io` reader or writer into a native
//! handle, and the byte adapters implement the `embedded_io` traits so they
//! can be handed to drivers written against that ecosystem.

use crate::{
    adapters::{DuplexBuffer, InputBuffer, OutputBuffer},
    domain::{
        error::BufError,
        ports::{Handle, NativeRead, NativeSeek, NativeWrite, SeekFrom},
    },
    infrastructure::MemoryError,
};
use aligned::Alignment;
use embedded_io::{BufRead, ErrorKind, ErrorType, Read, Seek, Write};

// Convert embedded_io's SeekFrom to ours
fn convert_seek_from(from: embedded_io::SeekFrom) -> SeekFrom {
    match from {
        embedded_io::SeekFrom::Start(n) => SeekFrom::Start(n),
        embedded_io::SeekFrom::End(n) => SeekFrom::End(n),
        embedded_io::SeekFrom::Current(n) => SeekFrom::Current(n),
    }
}

impl<E: embedded_io::Error> embedded_io::Error for BufError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(e) => e.kind(),
            Self::Alloc(_) => ErrorKind::OutOfMemory,
            Self::WriteZero => ErrorKind::WriteZero,
            Self::CursorOutOfRange { .. } | Self::InvalidSeek => ErrorKind::InvalidInput,
        }
    }
}

impl embedded_io::Error for MemoryError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

/// Native byte handle over a blocking `embedded_io` type.
///
/// Loops short reads and writes into the bulk contract the same way
/// [`FromStd`](crate::FromStd) does.
#[derive(Debug, Clone, Default)]
pub struct FromEmbeddedIo<T> {
    inner: T,
}

impl<T> FromEmbeddedIo<T> {
    /// Wrap an `embedded_io` value.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped value.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Borrow the wrapped value mutably.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the `embedded_io` value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: ErrorType> Handle for FromEmbeddedIo<T> {
    type Unit = u8;
    type Error = T::Error;
}

impl<T: Read> NativeRead for FromEmbeddedIo<T> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize, T::Error> {
        let mut total = 0;
        while total < dst.len() {
            match self.inner.read(&mut dst[total..])? {
                0 => break,
                n => total += n,
            }
        }
        Ok(total)
    }
}

impl<T: Write> NativeWrite for FromEmbeddedIo<T> {
    fn write(&mut self, src: &[u8]) -> Result<usize, T::Error> {
        let mut total = 0;
        while total < src.len() {
            match self.inner.write(&src[total..])? {
                0 => break,
                n => total += n,
            }
        }
        Ok(total)
    }

    fn flush(&mut self) -> Result<(), T::Error> {
        self.inner.flush()
    }
}

impl<T: Seek> NativeSeek for FromEmbeddedIo<T> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, T::Error> {
        let pos = match pos {
            SeekFrom::Start(n) => embedded_io::SeekFrom::Start(n),
            SeekFrom::Current(n) => embedded_io::SeekFrom::Current(n),
            SeekFrom::End(n) => embedded_io::SeekFrom::End(n),
        };
        self.inner.seek(pos)
    }
}

// Implement for InputBuffer
impl<H, const CAP: usize, A> ErrorType for InputBuffer<H, CAP, A>
where
    H: Handle,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    type Error = BufError<H::Error>;
}

impl<H, const CAP: usize, A> Read for InputBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8>,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        InputBuffer::read(self, buf)
    }
}

impl<H, const CAP: usize, A> BufRead for InputBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8>,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    fn fill_buf(&mut self) -> Result<&[u8], Self::Error> {
        InputBuffer::fill(self)?;
        Ok(InputBuffer::unread(self))
    }

    fn consume(&mut self, amt: usize) {
        InputBuffer::consume(self, amt)
    }
}

impl<H, const CAP: usize, A> Seek for InputBuffer<H, CAP, A>
where
    H: NativeSeek<Unit = u8>,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    fn seek(&mut self, pos: embedded_io::SeekFrom) -> Result<u64, Self::Error> {
        InputBuffer::seek(self, convert_seek_from(pos))
    }
}

// Implement for OutputBuffer
impl<H, const CAP: usize, A> ErrorType for OutputBuffer<H, CAP, A>
where
    H: NativeWrite,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    type Error = BufError<H::Error>;
}

impl<H, const CAP: usize, A> Write for OutputBuffer<H, CAP, A>
where
    H: NativeWrite<Unit = u8>,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        OutputBuffer::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.sync()
    }
}

impl<H, const CAP: usize, A> Seek for OutputBuffer<H, CAP, A>
where
    H: NativeWrite<Unit = u8> + NativeSeek,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    fn seek(&mut self, pos: embedded_io::SeekFrom) -> Result<u64, Self::Error> {
        OutputBuffer::seek(self, convert_seek_from(pos))
    }
}

// Implement for DuplexBuffer
impl<H, const CAP: usize, A> ErrorType for DuplexBuffer<H, CAP, A>
where
    H: NativeRead + NativeWrite,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    type Error = BufError<H::Error>;
}

impl<H, const CAP: usize, A> Read for DuplexBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8> + NativeWrite,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        DuplexBuffer::read(self, buf)
    }
}

impl<H, const CAP: usize, A> BufRead for DuplexBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8> + NativeWrite,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    fn fill_buf(&mut self) -> Result<&[u8], Self::Error> {
        DuplexBuffer::fill(self)?;
        Ok(DuplexBuffer::unread(self))
    }

    fn consume(&mut self, amt: usize) {
        DuplexBuffer::consume(self, amt)
    }
}

impl<H, const CAP: usize, A> Write for DuplexBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8> + NativeWrite,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        DuplexBuffer::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.sync()
    }
}

impl<H, const CAP: usize, A> Seek for DuplexBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8> + NativeWrite + NativeSeek,
    H::Error: embedded_io::Error,
    A: Alignment,
{
    fn seek(&mut self, pos: embedded_io::SeekFrom) -> Result<u64, Self::Error> {
        DuplexBuffer::seek(self, convert_seek_from(pos))
    }
}
