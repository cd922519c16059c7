//! Infrastructure layer - concrete handles and ecosystem bridges.
//!
//! This module provides native handles the adapters can wrap (in-memory,
//! `std::io`, `embedded_io`), the standard trait implementations for the
//! byte adapters, and scanning helpers built on [`BufferedInput`].
//!
//! [`BufferedInput`]: crate::domain::ports::BufferedInput

mod memory;
pub mod scan;

#[cfg(feature = "std")]
mod std_io;

#[cfg(feature = "embedded-io")]
mod embedded_io_impl;

pub use memory::{MemoryError, MemoryHandle};

#[cfg(feature = "std")]
pub use std_io::FromStd;

#[cfg(feature = "embedded-io")]
pub use embedded_io_impl::FromEmbeddedIo;
