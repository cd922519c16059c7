//! Bridges to `std::io`.
//!
//! [`FromStd`] turns any `std::io` reader or writer into a native handle, and
//! the byte adapters implement `std::io::{Read, BufRead, Write, Seek}` so
//! they drop into code written against the standard traits.

use crate::{
    adapters::{DuplexBuffer, InputBuffer, OutputBuffer},
    domain::ports::{
        Handle, NativeRead, NativeSeek, NativeWrite, SeekFrom, ZeroCopyIn, ZeroCopyOut,
    },
};
use aligned::Alignment;
use std::io::{self, BufRead, ErrorKind, Read, Seek, Write};

impl From<io::SeekFrom> for SeekFrom {
    fn from(pos: io::SeekFrom) -> Self {
        match pos {
            io::SeekFrom::Start(n) => SeekFrom::Start(n),
            io::SeekFrom::Current(n) => SeekFrom::Current(n),
            io::SeekFrom::End(n) => SeekFrom::End(n),
        }
    }
}

impl From<SeekFrom> for io::SeekFrom {
    fn from(pos: SeekFrom) -> Self {
        match pos {
            SeekFrom::Start(n) => io::SeekFrom::Start(n),
            SeekFrom::Current(n) => io::SeekFrom::Current(n),
            SeekFrom::End(n) => io::SeekFrom::End(n),
        }
    }
}

/// Native byte handle over a `std::io` type.
///
/// `std` readers may return short counts at any time; this wrapper keeps
/// reading until the destination is full or the reader reports end-of-file,
/// which is what the bulk read contract requires. Writes likewise loop until
/// everything is accepted or the writer accepts nothing. `Interrupted` is
/// retried.
///
/// On an interactive source (a terminal or a pipe) a read therefore waits for
/// a full buffer or end-of-file.
///
/// # Examples
///
/// ```
/// use bufrs::{FromStd, OutputBuffer};
///
/// let mut output = OutputBuffer::<_, 64>::new(FromStd::new(Vec::new()));
/// output.write(b"hello").unwrap();
/// let sink = output.into_inner().unwrap().into_inner();
/// assert_eq!(sink, b"hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FromStd<T: ?Sized> {
    inner: T,
}

impl<T> FromStd<T> {
    /// Wrap a `std::io` value.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Unwrap the `std::io` value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: ?Sized> FromStd<T> {
    /// Borrow the wrapped value.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Borrow the wrapped value mutably.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: ?Sized> Handle for FromStd<T> {
    type Unit = u8;
    type Error = io::Error;
}

impl<T: Read + ?Sized> NativeRead for FromStd<T> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let mut total = 0;
        while total < dst.len() {
            match self.inner.read(&mut dst[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }
}

impl<T: Write + ?Sized> NativeWrite for FromStd<T> {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        let mut total = 0;
        while total < src.len() {
            match self.inner.write(&src[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<T: Seek + ?Sized> NativeSeek for FromStd<T> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos.into())
    }
}

#[cfg(unix)]
impl<T: std::os::fd::AsRawFd + ?Sized> ZeroCopyIn for FromStd<T> {
    type Raw = std::os::fd::RawFd;

    fn zero_copy_in_handle(&self) -> Self::Raw {
        self.inner.as_raw_fd()
    }
}

#[cfg(unix)]
impl<T: std::os::fd::AsRawFd + ?Sized> ZeroCopyOut for FromStd<T> {
    type Raw = std::os::fd::RawFd;

    fn zero_copy_out_handle(&self) -> Self::Raw {
        self.inner.as_raw_fd()
    }
}

// std::io traits for the byte adapters

impl<H, const CAP: usize, A> Read for InputBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8>,
    H::Error: Into<io::Error>,
    A: Alignment,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        InputBuffer::read(self, buf).map_err(io::Error::from)
    }
}

impl<H, const CAP: usize, A> BufRead for InputBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8>,
    H::Error: Into<io::Error>,
    A: Alignment,
{
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        InputBuffer::fill(self).map_err(io::Error::from)?;
        Ok(InputBuffer::unread(self))
    }

    fn consume(&mut self, amt: usize) {
        InputBuffer::consume(self, amt)
    }
}

impl<H, const CAP: usize, A> Seek for InputBuffer<H, CAP, A>
where
    H: NativeSeek<Unit = u8>,
    H::Error: Into<io::Error>,
    A: Alignment,
{
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        InputBuffer::seek(self, pos.into()).map_err(io::Error::from)
    }
}

impl<H, const CAP: usize, A> Write for OutputBuffer<H, CAP, A>
where
    H: NativeWrite<Unit = u8>,
    H::Error: Into<io::Error>,
    A: Alignment,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        OutputBuffer::write(self, buf).map_err(io::Error::from)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sync().map_err(io::Error::from)
    }
}

impl<H, const CAP: usize, A> Seek for OutputBuffer<H, CAP, A>
where
    H: NativeWrite<Unit = u8> + NativeSeek,
    H::Error: Into<io::Error>,
    A: Alignment,
{
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        OutputBuffer::seek(self, pos.into()).map_err(io::Error::from)
    }
}

impl<H, const CAP: usize, A> Read for DuplexBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8> + NativeWrite,
    H::Error: Into<io::Error>,
    A: Alignment,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        DuplexBuffer::read(self, buf).map_err(io::Error::from)
    }
}

impl<H, const CAP: usize, A> BufRead for DuplexBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8> + NativeWrite,
    H::Error: Into<io::Error>,
    A: Alignment,
{
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        DuplexBuffer::fill(self).map_err(io::Error::from)?;
        Ok(DuplexBuffer::unread(self))
    }

    fn consume(&mut self, amt: usize) {
        DuplexBuffer::consume(self, amt)
    }
}

impl<H, const CAP: usize, A> Write for DuplexBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8> + NativeWrite,
    H::Error: Into<io::Error>,
    A: Alignment,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        DuplexBuffer::write(self, buf).map_err(io::Error::from)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sync().map_err(io::Error::from)
    }
}

impl<H, const CAP: usize, A> Seek for DuplexBuffer<H, CAP, A>
where
    H: NativeRead<Unit = u8> + NativeWrite + NativeSeek,
    H::Error: Into<io::Error>,
    A: Alignment,
{
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        DuplexBuffer::seek(self, pos.into()).map_err(io::Error::from)
    }
}
