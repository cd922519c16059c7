//! Domain-level errors.
//!
//! Handle failures arrive through the port error type `E` and are carried
//! unchanged in [`BufError::Io`]. Everything else is a failure of the
//! buffering layer itself.

use core::fmt;

/// The aligned buffer could not be allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AllocError {
    /// Requested allocation size in bytes.
    pub bytes: usize,
    /// Requested alignment in bytes.
    pub align: usize,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to allocate {} bytes with alignment {}",
            self.bytes, self.align
        )
    }
}

impl core::error::Error for AllocError {}

/// Errors produced by the buffered adapters.
#[derive(Debug)]
#[non_exhaustive]
pub enum BufError<E> {
    /// Acquiring the buffer failed.
    Alloc(AllocError),

    /// Error from the underlying native handle.
    ///
    /// This wraps errors that come from the infrastructure layer through
    /// the handle ports.
    Io(E),

    /// The handle accepted no units while a full write was required.
    WriteZero,

    /// A cursor was moved outside the valid region of the buffer.
    CursorOutOfRange {
        /// The requested cursor position.
        requested: usize,
        /// The largest permitted position.
        limit: usize,
    },

    /// A relative seek could not be corrected for buffered units.
    InvalidSeek,
}

impl<E> BufError<E> {
    /// Returns the handle error, if this is one.
    pub fn into_io(self) -> Option<E> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }

    /// Maps the handle error with `f`, leaving other variants untouched.
    pub fn map_io<F, O>(self, f: O) -> BufError<F>
    where
        O: FnOnce(E) -> F,
    {
        match self {
            Self::Alloc(a) => BufError::Alloc(a),
            Self::Io(e) => BufError::Io(f(e)),
            Self::WriteZero => BufError::WriteZero,
            Self::CursorOutOfRange { requested, limit } => {
                BufError::CursorOutOfRange { requested, limit }
            }
            Self::InvalidSeek => BufError::InvalidSeek,
        }
    }
}

impl<E> BufError<BufError<E>> {
    /// Collapses an error from an adapter stacked on another adapter.
    ///
    /// A duplex buffer's output layer sees the input layer as its handle, so
    /// its errors nest one level deep.
    pub fn flatten(self) -> BufError<E> {
        match self {
            Self::Io(inner) => inner,
            Self::Alloc(a) => BufError::Alloc(a),
            Self::WriteZero => BufError::WriteZero,
            Self::CursorOutOfRange { requested, limit } => {
                BufError::CursorOutOfRange { requested, limit }
            }
            Self::InvalidSeek => BufError::InvalidSeek,
        }
    }
}

impl<E> From<AllocError> for BufError<E> {
    fn from(err: AllocError) -> Self {
        Self::Alloc(err)
    }
}

impl<E: fmt::Display> fmt::Display for BufError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloc(e) => write!(f, "Buffer allocation error: {}", e),
            Self::Io(e) => write!(f, "Handle error: {}", e),
            Self::WriteZero => write!(f, "Handle accepted no data during a full write"),
            Self::CursorOutOfRange { requested, limit } => write!(
                f,
                "Cursor position {} is outside the buffer (limit {})",
                requested, limit
            ),
            Self::InvalidSeek => write!(f, "Invalid seek position"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for BufError<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

// Note: no blanket From<E> for BufError<E>; it would collide with
// From<AllocError>. Use BufError::Io or map_err at the handle boundary.

/// Returned by `into_inner` when the final flush fails.
///
/// Carries the adapter back so that no buffered data is silently lost.
#[derive(Debug)]
pub struct IntoInnerError<W, E> {
    inner: W,
    error: BufError<E>,
}

impl<W, E> IntoInnerError<W, E> {
    pub(crate) fn new(inner: W, error: BufError<E>) -> Self {
        Self { inner, error }
    }

    /// The error that prevented the flush.
    pub fn error(&self) -> &BufError<E> {
        &self.error
    }

    /// Recover the adapter, buffered data intact.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Split into the adapter and the error.
    pub fn into_parts(self) -> (W, BufError<E>) {
        (self.inner, self.error)
    }
}

impl<W, E: fmt::Display> fmt::Display for IntoInnerError<W, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flush before unwrapping failed: {}", self.error)
    }
}

impl<W: fmt::Debug, E: fmt::Debug + fmt::Display> core::error::Error for IntoInnerError<W, E> {}

#[cfg(feature = "std")]
impl<E: Into<std::io::Error>> From<BufError<E>> for std::io::Error {
    fn from(err: BufError<E>) -> Self {
        use std::io::{Error, ErrorKind};

        match err {
            BufError::Io(e) => e.into(),
            BufError::Alloc(a) => Error::new(ErrorKind::OutOfMemory, a),
            BufError::WriteZero => Error::from(ErrorKind::WriteZero),
            BufError::CursorOutOfRange { requested, limit } => Error::new(
                ErrorKind::InvalidInput,
                std::format!("cursor {requested} outside buffer (limit {limit})"),
            ),
            BufError::InvalidSeek => Error::new(ErrorKind::InvalidInput, "invalid seek position"),
        }
    }
}
