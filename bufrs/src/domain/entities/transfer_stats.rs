//! Transfer statistics kept by every adapter.

/// Counters describing how an adapter has talked to its handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferStats {
    /// Bulk reads issued to the handle (refills and passthroughs).
    pub handle_reads: u64,
    /// Bulk writes issued to the handle (flushes and passthroughs).
    pub handle_writes: u64,
    /// Buffer allocations performed.
    pub allocations: u64,
    /// Reads that bypassed the buffer.
    pub passthrough_reads: u64,
    /// Writes that bypassed the buffer.
    pub passthrough_writes: u64,
}

impl TransferStats {
    /// Total number of handle calls.
    #[inline]
    pub const fn handle_calls(&self) -> u64 {
        self.handle_reads + self.handle_writes
    }
}
