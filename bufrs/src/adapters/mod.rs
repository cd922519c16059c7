//! Adapter layer - Buffered handles built on the domain's transfer algorithms.
//!
//! Each adapter owns a native handle and one aligned buffer, and implements
//! the same ports it consumes, so adapters stack like any other handle.
//!
//! # Hexagonal Architecture
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │      Caller                      │
//!     └────────────┬─────────────────────┘
//!                  │
//!                  │ read / write / seek
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │      Adapter Layer               │  ◄── This module
//!     │  - InputBuffer                   │
//!     │  - OutputBuffer                  │
//!     │  - DuplexBuffer                  │
//!     └────────────┬─────────────────────┘
//!                  │
//!                  │ bulk NativeRead / NativeWrite
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │  Infrastructure (native handle)  │
//!     └──────────────────────────────────┘
//! ```
//!
//! # Available Adapters
//!
//! - **`InputBuffer`**: Refill-on-miss reader with passthrough for large reads
//! - **`OutputBuffer`**: Flush-on-overflow writer, flushes on drop
//! - **`DuplexBuffer`**: `OutputBuffer<InputBuffer<H>>` with flattened errors

mod duplex_buffer;
mod input_buffer;
mod output_buffer;

pub use duplex_buffer::DuplexBuffer;
pub use input_buffer::InputBuffer;
pub use output_buffer::OutputBuffer;
