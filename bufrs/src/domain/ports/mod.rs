//! Ports define the interfaces between the domain and the outside world.
//!
//! In hexagonal architecture, ports are the boundaries of the application:
//! - **Primary (Driving) Ports**: What the domain exposes to the outside world
//! - **Secondary (Driven) Ports**: What the domain needs from the outside world
//!
//! The native handle traits are **secondary (driven) ports**. `BufferedInput`
//! is a **primary port**: the adapters expose it to scanning helpers.

mod capabilities;
mod handle;

pub use capabilities::{BufferedInput, MemoryMapIn, ZeroCopyIn, ZeroCopyOut};
pub use handle::{Handle, NativeRead, NativeSeek, NativeWrite, SeekFrom};
