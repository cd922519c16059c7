//! Buffered I/O adapters with hexagonal architecture.
//!
//! This crate puts a fixed-size, aligned buffer between a caller that moves
//! sequences of code units and a *native handle* that only does bulk,
//! unbuffered reads, writes and seeks (a file descriptor, a socket, a memory
//! region).
//!
//! # Architecture
//!
//! The crate is organized into three layers:
//!
//! ## Domain Layer (`domain`)
//! Pure buffering logic with no infrastructure dependencies:
//! - **Entities**: `BufferStorage` (aligned, lazily allocated, move-only),
//!   `TransferStats`
//! - **Value Objects**: `CodeUnit`, capacity presets
//! - **Services**: the transfer algorithms (fill-on-miss, flush-on-overflow,
//!   large-transfer passthrough, seek invalidation)
//! - **Ports**: `NativeRead`, `NativeWrite`, `NativeSeek` and the optional
//!   zero-copy and memory-map capabilities
//!
//! ## Adapter Layer (`adapters`)
//! - **`InputBuffer`**: refills on miss, bypasses the buffer for large reads
//! - **`OutputBuffer`**: flushes on overflow and on drop, optional full retry
//!   of short writes
//! - **`DuplexBuffer`**: an output buffer stacked on an input buffer
//!
//! ## Infrastructure Layer (`infrastructure`)
//! - `MemoryHandle`, `FromStd`, `FromEmbeddedIo` native handles
//! - `std::io` and `embedded_io` trait implementations for byte adapters
//! - Scanning helpers (`read_to_end`, `next_token`, `read_line`)
//!
//! # Quick Start
//!
//! ```
//! use bufrs::{InputBuffer, MemoryHandle, OutputBuffer};
//!
//! // 8-unit buffers to keep the example small.
//! let mut output = OutputBuffer::<_, 8>::new(MemoryHandle::empty());
//! for &b in b"ABCDEFGHIJKLMNOPQRST" {
//!     output.put(b)?;
//! }
//! let written = output.into_inner().map_err(|e| e.into_parts().1)?.into_inner();
//!
//! let mut input = InputBuffer::<_, 8>::new(MemoryHandle::new(written));
//! let mut buf = [0u8; 20];
//! assert_eq!(input.read(&mut buf)?, 20);
//! assert_eq!(&buf, b"ABCDEFGHIJKLMNOPQRST");
//! # Ok::<(), bufrs::BufError<bufrs::MemoryError>>(())
//! ```
//!
//! # Features
//!
//! - `std` (default): `FromStd` and the `std::io` trait implementations
//! - `embedded-io`: `FromEmbeddedIo` and the `embedded_io` trait
//!   implementations
//! - `log`: Enable logging support
//! - `defmt`: Enable defmt logging for embedded

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod fmt;

// Core layers
pub mod adapters;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    presets, AllocError, BufError, BufferStorage, BufferedInput, CodeUnit, Handle,
    IntoInnerError, MemoryMapIn, NativeRead, NativeSeek, NativeWrite, SeekFrom, TransferStats,
    ZeroCopyIn, ZeroCopyOut, DEFAULT_CAPACITY,
};

pub use adapters::{DuplexBuffer, InputBuffer, OutputBuffer};

// Infrastructure layer exports
pub use infrastructure::{
    scan::{next_token, read_line, read_to_end, tokens},
    MemoryError, MemoryHandle,
};

#[cfg(feature = "std")]
pub use infrastructure::FromStd;

#[cfg(feature = "embedded-io")]
pub use infrastructure::FromEmbeddedIo;

// Re-export aligned so callers can name alignment markers
pub use aligned;

#[cfg(feature = "embedded-io")]
pub use embedded_io;
