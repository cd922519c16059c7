//! Buffer capacity constants.
//!
//! Capacities are const generic parameters measured in code units, never
//! runtime configuration.

/// Default buffer capacity in code units.
///
/// 1 MiB on Windows, where large transfers are markedly cheaper per call,
/// and 64 KiB elsewhere.
#[cfg(windows)]
pub const DEFAULT_CAPACITY: usize = 1024 * 1024;

/// Default buffer capacity in code units.
///
/// 1 MiB on Windows, where large transfers are markedly cheaper per call,
/// and 64 KiB elsewhere.
#[cfg(not(windows))]
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Common buffer capacity presets, in code units.
pub mod presets {
    /// 512 units (one classic sector).
    pub const BUF_512: usize = 512;

    /// 4K units (typical page size).
    pub const BUF_4K: usize = 4 * 1024;

    /// 8K units (glibc `BUFSIZ`).
    pub const BUF_8K: usize = 8 * 1024;

    /// 64K units.
    pub const BUF_64K: usize = 64 * 1024;

    /// 128K units (optimal for many SSDs).
    pub const BUF_128K: usize = 128 * 1024;

    /// 1M units (for very large sequential I/O).
    pub const BUF_1M: usize = 1024 * 1024;
}
