//! In-memory native handle.
//!
//! A growable array of code units with a position, behaving like a file:
//! reads stop at the end, writes overwrite and extend, seeks past the end are
//! allowed and the gap is zero-filled by the next write.

use crate::domain::{
    ports::{Handle, MemoryMapIn, NativeRead, NativeSeek, NativeWrite, SeekFrom},
    value_objects::CodeUnit,
};
use alloc::vec::Vec;
use core::fmt;

/// Error returned by [`MemoryHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryError {
    /// The seek would move before the start of the data.
    InvalidSeek,
    /// A write would end past what the handle can address or allocate.
    OutOfRange,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSeek => write!(f, "Seek before start of memory region"),
            Self::OutOfRange => write!(f, "Write past addressable end of memory region"),
        }
    }
}

impl core::error::Error for MemoryError {}

#[cfg(feature = "std")]
impl From<MemoryError> for std::io::Error {
    fn from(err: MemoryError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    }
}

/// Seekable in-memory handle over a `Vec` of code units.
///
/// # Examples
///
/// ```
/// use bufrs::{InputBuffer, MemoryHandle};
///
/// let handle = MemoryHandle::new(b"hello".to_vec());
/// let mut input = InputBuffer::<_, 4>::new(handle);
///
/// let mut buf = [0u8; 5];
/// assert_eq!(input.read(&mut buf).unwrap(), 5);
/// assert_eq!(&buf, b"hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryHandle<T> {
    data: Vec<T>,
    pos: usize,
    write_limit: Option<usize>,
}

impl<T: CodeUnit> MemoryHandle<T> {
    /// Wrap existing contents, positioned at the start.
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            pos: 0,
            write_limit: None,
        }
    }

    /// An empty handle.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Accept at most `limit` units per write call.
    ///
    /// Short writes are legal for native handles; this makes them happen.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Current position in units.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The whole contents.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume the handle, returning its contents.
    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}

impl<T: CodeUnit> Handle for MemoryHandle<T> {
    type Unit = T;
    type Error = MemoryError;
}

impl<T: CodeUnit> NativeRead for MemoryHandle<T> {
    fn read(&mut self, dst: &mut [T]) -> Result<usize, MemoryError> {
        let available = self.data.get(self.pos..).unwrap_or(&[]);
        let n = dst.len().min(available.len());
        dst[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl<T: CodeUnit> NativeWrite for MemoryHandle<T> {
    fn write(&mut self, src: &[T]) -> Result<usize, MemoryError> {
        let n = self.write_limit.map_or(src.len(), |limit| limit.min(src.len()));
        let end = self.pos.checked_add(n).ok_or(MemoryError::OutOfRange)?;
        if self.data.len() < end {
            self.data
                .try_reserve(end - self.data.len())
                .map_err(|_| MemoryError::OutOfRange)?;
            self.data.resize(end, T::default());
        }
        self.data[self.pos..end].copy_from_slice(&src[..n]);
        self.pos = end;
        Ok(n)
    }
}

impl<T: CodeUnit> NativeSeek for MemoryHandle<T> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, MemoryError> {
        let (base, offset) = match pos {
            SeekFrom::Start(n) => {
                self.pos = usize::try_from(n).map_err(|_| MemoryError::InvalidSeek)?;
                return Ok(n);
            }
            SeekFrom::Current(n) => (self.pos, n),
            SeekFrom::End(n) => (self.data.len(), n),
        };

        let target = i64::try_from(base)
            .ok()
            .and_then(|b| b.checked_add(offset))
            .filter(|&t| t >= 0)
            .ok_or(MemoryError::InvalidSeek)?;
        self.pos = usize::try_from(target).map_err(|_| MemoryError::InvalidSeek)?;
        Ok(target as u64)
    }
}

impl<T: CodeUnit> MemoryMapIn for MemoryHandle<T> {
    fn memory_map_in(&self) -> &[T] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_stops_at_end() {
        let mut handle = MemoryHandle::new(b"abc".to_vec());
        let mut buf = [0u8; 8];
        assert_eq!(handle.read(&mut buf).unwrap(), 3);
        assert_eq!(handle.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_write_overwrites_and_extends() {
        let mut handle = MemoryHandle::new(b"abcd".to_vec());
        handle.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(handle.write(b"XYZ").unwrap(), 3);
        assert_eq!(handle.as_slice(), b"abXYZ");
    }

    #[test]
    fn test_seek_past_end_zero_fills() {
        let mut handle = MemoryHandle::<u16>::empty();
        handle.seek(SeekFrom::Start(2)).unwrap();
        handle.write(&[7]).unwrap();
        assert_eq!(handle.as_slice(), &[0, 0, 7]);
    }

    #[test]
    fn test_write_limit() {
        let mut handle = MemoryHandle::<u8>::empty().with_write_limit(2);
        assert_eq!(handle.write(b"hello").unwrap(), 2);
        assert_eq!(handle.as_slice(), b"he");
    }

    #[test]
    fn test_seek_before_start_fails() {
        let mut handle = MemoryHandle::new(b"abc".to_vec());
        assert_eq!(handle.seek(SeekFrom::Current(-1)), Err(MemoryError::InvalidSeek));
        assert_eq!(handle.seek(SeekFrom::End(-1)).unwrap(), 2);
        assert_eq!(handle.position(), 2);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_write_at_unaddressable_position_fails() {
        let mut handle = MemoryHandle::<u8>::empty();
        handle.seek(SeekFrom::Start(u64::MAX)).unwrap();
        assert_eq!(handle.write(b"x"), Err(MemoryError::OutOfRange));
        assert!(handle.as_slice().is_empty());

        // Addressable but far too large to allocate.
        handle.seek(SeekFrom::Start(u64::MAX / 4)).unwrap();
        assert_eq!(handle.write(b"x"), Err(MemoryError::OutOfRange));
    }

    #[test]
    fn test_memory_map_in() {
        let handle = MemoryHandle::new(vec!['x', 'y']);
        assert_eq!(handle.memory_map_in(), &['x', 'y']);
    }
}
