//! Domain layer - Pure buffering logic with zero infrastructure dependencies.
//!
//! This is the core of the hexagonal architecture. The domain layer contains:
//! - **Entities**: Objects with lifecycle (`BufferStorage`, `TransferStats`)
//! - **Value Objects**: `CodeUnit` and the capacity presets
//! - **Domain Services**: The transfer algorithms (fill, flush, passthrough)
//! - **Ports**: The native handle traits and optional capabilities
//! - **Domain Errors**: `BufError`, `AllocError`, `IntoInnerError`
//!
//! # Hexagonal Architecture
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │      Domain Layer (Core)         │
//!     │                                  │
//!     │  ┌────────────────────────────┐  │
//!     │  │  Entities & Value Objects  │  │
//!     │  │  - BufferStorage, CodeUnit │  │
//!     │  └────────────────────────────┘  │
//!     │              ▲                   │
//!     │              │                   │
//!     │  ┌────────────────────────────┐  │
//!     │  │    Domain Services         │  │
//!     │  │    - transfer              │  │
//!     │  └────────────────────────────┘  │
//!     │              │                   │
//!     │              ▼                   │
//!     │  ┌────────────────────────────┐  │
//!     │  │    Ports (Interfaces)      │  │
//!     │  │    - NativeRead/Write/Seek │  │
//!     │  └────────────────────────────┘  │
//!     └──────────────────────────────────┘
//!                    ▲
//!                    │ implemented by
//!                    │
//!     ┌──────────────────────────────────┐
//!     │      Adapter Layer               │
//!     │  - InputBuffer                   │
//!     │  - OutputBuffer                  │
//!     │  - DuplexBuffer                  │
//!     └──────────────────────────────────┘
//! ```
//!
//! Adapters implement the same ports they consume, so they stack: an
//! `OutputBuffer<InputBuffer<H>>` is a handle like any other.

pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub(crate) mod transfer;

// Re-export commonly used types
pub use entities::{BufferStorage, TransferStats};
pub use error::{AllocError, BufError, IntoInnerError};
pub use ports::{
    BufferedInput, Handle, MemoryMapIn, NativeRead, NativeSeek, NativeWrite, SeekFrom, ZeroCopyIn,
    ZeroCopyOut,
};
pub use value_objects::{presets, CodeUnit, DEFAULT_CAPACITY};
