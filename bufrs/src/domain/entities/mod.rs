//! Domain entities.
//!
//! Entities are objects with identity and lifecycle: the aligned buffer
//! storage owns memory from first use until release, and its statistics
//! follow the adapter that owns it.

mod buffer_storage;
mod transfer_stats;

pub use buffer_storage::BufferStorage;
pub use transfer_stats::TransferStats;
