//! Native handle ports - Secondary (driven) ports for bulk unbuffered I/O.
//!
//! These ports define what the buffering layer needs from a file descriptor,
//! socket or memory region. Each capability is its own trait so adapters can
//! forward exactly the capabilities the wrapped handle has, selected by trait
//! bounds at compile time.
//!
//! # Hexagonal Architecture
//!
//! ```text
//! ┌─────────────────────────────┐
//! │   Domain Layer              │
//! │  (transfer algorithms)      │
//! └──────────────┬──────────────┘
//!                │ depends on
//!                ▼
//! ┌─────────────────────────────┐
//! │  NativeRead / NativeWrite / │  ◄── This module
//! │  NativeSeek ports           │
//! └──────────────┬──────────────┘
//!                │ implemented by
//!                ▼
//! ┌─────────────────────────────┐
//! │  Infrastructure Layer       │
//! │ (FromStd, MemoryHandle, ...)│
//! └─────────────────────────────┘
//! ```

use crate::domain::value_objects::CodeUnit;
use core::fmt;

/// Common associated types of every native handle.
pub trait Handle {
    /// The code unit moved by this handle.
    type Unit: CodeUnit;

    /// The error type for handle operations.
    ///
    /// This should be the underlying device error type (e.g., `std::io::Error`).
    type Error: fmt::Debug;
}

/// Bulk input from a native handle.
pub trait NativeRead: Handle {
    /// Read units into `dst`, returning how many were produced.
    ///
    /// # Behavior
    ///
    /// - Fills `dst[..n]` and returns `n`
    /// - `n == dst.len()` unless the stream ended; a short count means
    ///   end-of-stream, not "try again"
    /// - `n == 0` for a non-empty `dst` means the stream is exhausted
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying transfer fails.
    fn read(&mut self, dst: &mut [Self::Unit]) -> Result<usize, Self::Error>;
}

/// Bulk output to a native handle.
pub trait NativeWrite: Handle {
    /// Write units from `src`, returning how many were accepted.
    ///
    /// A short count is permitted. Buffered adapters only act on it when
    /// constructed with full retry enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying transfer fails.
    fn write(&mut self, src: &[Self::Unit]) -> Result<usize, Self::Error>;

    /// Flush any cached writes further down the stack.
    ///
    /// The default implementation is a no-op.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Seek position, measured in code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeekFrom {
    /// Offset from the start of the stream.
    Start(u64),
    /// Offset relative to the current position.
    Current(i64),
    /// Offset from the end of the stream.
    End(i64),
}

/// Random access on a native handle.
pub trait NativeSeek: Handle {
    /// Move the handle's position, returning the new offset from the start.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is invalid or the handle cannot seek.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error>;
}

impl<H: Handle + ?Sized> Handle for &mut H {
    type Unit = H::Unit;
    type Error = H::Error;
}

impl<H: NativeRead + ?Sized> NativeRead for &mut H {
    #[inline]
    fn read(&mut self, dst: &mut [Self::Unit]) -> Result<usize, Self::Error> {
        (**self).read(dst)
    }
}

impl<H: NativeWrite + ?Sized> NativeWrite for &mut H {
    #[inline]
    fn write(&mut self, src: &[Self::Unit]) -> Result<usize, Self::Error> {
        (**self).write(src)
    }

    #[inline]
    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}

impl<H: NativeSeek + ?Sized> NativeSeek for &mut H {
    #[inline]
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        (**self).seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    // Counts down from a start value, one unit per slot.
    struct Countdown {
        next: u8,
    }

    impl Handle for Countdown {
        type Unit = u8;
        type Error = Infallible;
    }

    impl NativeRead for Countdown {
        fn read(&mut self, dst: &mut [u8]) -> Result<usize, Infallible> {
            let mut n = 0;
            for slot in dst.iter_mut() {
                if self.next == 0 {
                    break;
                }
                *slot = self.next;
                self.next -= 1;
                n += 1;
            }
            Ok(n)
        }
    }

    #[test]
    fn test_short_read_signals_end_of_stream() {
        let mut handle = Countdown { next: 3 };
        let mut buf = [0u8; 8];
        assert_eq!(handle.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[3, 2, 1]);
        assert_eq!(handle.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut handle = Countdown { next: 2 };
        let mut by_ref = &mut handle;
        let mut buf = [0u8; 1];
        assert_eq!(NativeRead::read(&mut by_ref, &mut buf).unwrap(), 1);
        assert_eq!(handle.next, 1);
    }
}
