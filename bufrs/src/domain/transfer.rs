//! Transfer algorithms - the fill/flush/passthrough decisions.
//!
//! Both adapters are thin shells around the functions in this module. Each
//! function takes the storage, the handle and the statistics separately so
//! the same code serves an input buffer, an output buffer, and an output
//! buffer stacked on an input buffer.
//!
//! # Rules
//!
//! - Hot path: the request fits in the buffer; copy and move a cursor, never
//!   touch the handle
//! - Cold path: refill (input) or flush (output), or bypass the buffer
//!   entirely when the remaining span is at least one capacity long
//! - A cold buffer is only allocated once a transfer actually needs it

use crate::domain::{
    entities::{BufferStorage, TransferStats},
    error::BufError,
    ports::{NativeRead, NativeSeek, NativeWrite, SeekFrom},
    value_objects::CodeUnit,
};
use aligned::Alignment;
use core::mem;

/// Copy `src` into `dst` (same length).
///
/// Raw slice copy when the unit is byte-punnable, element-wise otherwise.
/// The branch is on a constant and folds away.
#[inline]
pub(crate) fn copy_units<T: CodeUnit>(dst: &mut [T], src: &[T]) {
    if T::BYTE_PUNNABLE {
        dst.copy_from_slice(src);
    } else {
        debug_assert_eq!(dst.len(), src.len());
        for (d, s) in dst.iter_mut().zip(src) {
            *d = *s;
        }
    }
}

/// View a slice of punnable units as raw bytes.
#[inline]
pub(crate) fn units_as_bytes<U: CodeUnit>(units: &[U]) -> &[u8] {
    const { assert!(U::BYTE_PUNNABLE, "unit type cannot be reinterpreted as bytes") };
    // SAFETY: `CodeUnit` guarantees no padding, so every byte of the slice is
    // initialised; the length is the slice's size in bytes.
    unsafe { core::slice::from_raw_parts(units.as_ptr().cast::<u8>(), mem::size_of_val(units)) }
}

/// View a slice of punnable units as raw bytes, mutably.
#[inline]
pub(crate) fn units_as_bytes_mut<U: CodeUnit>(units: &mut [U]) -> &mut [u8] {
    const { assert!(U::BYTE_PUNNABLE, "unit type cannot be reinterpreted as bytes") };
    let len = mem::size_of_val(units);
    // SAFETY: as above; `BYTE_PUNNABLE` guarantees any bytes written through
    // the view leave valid units behind.
    unsafe { core::slice::from_raw_parts_mut(units.as_mut_ptr().cast::<u8>(), len) }
}

fn handle_read<H: NativeRead>(
    handle: &mut H,
    stats: &mut TransferStats,
    dst: &mut [H::Unit],
) -> Result<usize, BufError<H::Error>> {
    stats.handle_reads += 1;
    let n = handle.read(dst).map_err(BufError::Io)?;
    Ok(n.min(dst.len()))
}

fn handle_write<H: NativeWrite>(
    handle: &mut H,
    stats: &mut TransferStats,
    src: &[H::Unit],
) -> Result<usize, BufError<H::Error>> {
    stats.handle_writes += 1;
    let n = handle.write(src).map_err(BufError::Io)?;
    Ok(n.min(src.len()))
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Serve `dst` from the buffer, refilling from `handle` on a miss.
///
/// Returns the number of units produced; short only at end-of-stream.
#[inline]
pub(crate) fn read<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
    dst: &mut [H::Unit],
) -> Result<usize, BufError<H::Error>>
where
    H: NativeRead,
    A: Alignment,
{
    let n = dst.len();
    let unread = storage.unread();
    if n <= unread.len() {
        copy_units(dst, &unread[..n]);
        storage.advance(n);
        return Ok(n);
    }
    read_cold(storage, handle, stats, dst)
}

#[cold]
fn read_cold<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
    dst: &mut [H::Unit],
) -> Result<usize, BufError<H::Error>>
where
    H: NativeRead,
    A: Alignment,
{
    if !storage.is_allocated() {
        if dst.len() >= CAP {
            trace!("passthrough read of {} units on cold buffer", dst.len());
            stats.passthrough_reads += 1;
            return handle_read(handle, stats, dst);
        }
        storage.init_space()?;
        stats.allocations += 1;
        debug!("allocated input buffer of {} units", CAP);
    }

    // Drain whatever is still buffered.
    let buffered = storage.unread().len();
    copy_units(&mut dst[..buffered], storage.unread());
    storage.reset();
    let done = buffered;
    let rest = &mut dst[done..];

    if rest.len() >= CAP {
        trace!("passthrough read of {} units", rest.len());
        stats.passthrough_reads += 1;
        let n = handle_read(handle, stats, rest)?;
        return Ok(done + n);
    }

    let fetched = handle_read(handle, stats, storage.as_mut_slice())?;
    storage.set_end(fetched);
    trace!("refilled input buffer with {} units", fetched);

    let n = rest.len().min(fetched);
    copy_units(&mut rest[..n], &storage.filled()[..n]);
    storage.set_current(n);
    Ok(done + n)
}

/// Refill the buffer when it is exhausted.
///
/// Returns whether any unread units are available afterwards.
pub(crate) fn fill<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
) -> Result<bool, BufError<H::Error>>
where
    H: NativeRead,
    A: Alignment,
{
    if storage.current() < storage.end() {
        return Ok(true);
    }
    if !storage.is_allocated() {
        storage.init_space()?;
        stats.allocations += 1;
        debug!("allocated input buffer of {} units", CAP);
    }

    storage.reset();
    let fetched = handle_read(handle, stats, storage.as_mut_slice())?;
    storage.set_end(fetched);
    trace!("refilled input buffer with {} units", fetched);
    Ok(fetched != 0)
}

/// Seek an input handle, correcting for units fetched but not consumed.
///
/// The buffer is invalidated before the handle moves.
pub(crate) fn seek_input<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    pos: SeekFrom,
) -> Result<u64, BufError<H::Error>>
where
    H: NativeSeek,
    A: Alignment,
{
    let unread = storage.unread().len();
    let pos = match pos {
        SeekFrom::Current(offset) => {
            let unread = i64::try_from(unread).map_err(|_| BufError::InvalidSeek)?;
            SeekFrom::Current(offset.checked_sub(unread).ok_or(BufError::InvalidSeek)?)
        }
        absolute => absolute,
    };

    let end = storage.end();
    storage.set_current(end);
    handle.seek(pos).map_err(BufError::Io)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn allocate_output<T, const CAP: usize, A, E>(
    storage: &mut BufferStorage<T, CAP, A>,
    stats: &mut TransferStats,
) -> Result<(), BufError<E>>
where
    T: CodeUnit,
    A: Alignment,
{
    storage.init_space()?;
    storage.set_end(CAP);
    stats.allocations += 1;
    debug!("allocated output buffer of {} units", CAP);
    Ok(())
}

#[inline]
fn buffer_units<T: CodeUnit, const CAP: usize, A: Alignment>(
    storage: &mut BufferStorage<T, CAP, A>,
    src: &[T],
) {
    copy_units(&mut storage.spare_mut()[..src.len()], src);
    storage.advance(src.len());
}

/// Buffer `src`, flushing to `handle` on overflow.
#[inline]
pub(crate) fn write<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
    full_retry: bool,
    src: &[H::Unit],
) -> Result<(), BufError<H::Error>>
where
    H: NativeWrite,
    A: Alignment,
{
    if src.len() <= storage.end() - storage.current() {
        buffer_units(storage, src);
        return Ok(());
    }
    write_cold(storage, handle, stats, full_retry, src)
}

#[cold]
fn write_cold<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
    full_retry: bool,
    mut src: &[H::Unit],
) -> Result<(), BufError<H::Error>>
where
    H: NativeWrite,
    A: Alignment,
{
    if !storage.is_allocated() {
        if src.len() >= CAP {
            return write_direct(storage, handle, stats, full_retry, src);
        }
        allocate_output(storage, stats)?;
        buffer_units(storage, src);
        return Ok(());
    }

    // Without retry a flush always empties the buffer, so this runs once.
    // With retry a short flush leaves a tail behind and the loop goes
    // around again; flush_pending fails rather than make no progress.
    loop {
        let space = storage.end() - storage.current();
        if src.len() <= space {
            buffer_units(storage, src);
            return Ok(());
        }

        let (head, rest) = src.split_at(space);
        buffer_units(storage, head);
        flush_pending(storage, handle, stats, full_retry)?;
        src = rest;

        if storage.current() == 0 && src.len() >= CAP {
            return write_direct(storage, handle, stats, full_retry, src);
        }
    }
}

/// Write `src` straight to the handle.
///
/// The buffer must be empty (cold, or flushed). With retry enabled, an
/// unwritten tail shorter than one capacity is parked in the buffer for the
/// next flush and longer tails are re-issued.
fn write_direct<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
    full_retry: bool,
    src: &[H::Unit],
) -> Result<(), BufError<H::Error>>
where
    H: NativeWrite,
    A: Alignment,
{
    debug_assert_eq!(storage.current(), 0);
    trace!("passthrough write of {} units", src.len());
    stats.passthrough_writes += 1;

    let mut written = handle_write(handle, stats, src)?;
    if !full_retry {
        return Ok(());
    }

    while src.len() - written >= CAP {
        let n = handle_write(handle, stats, &src[written..])?;
        if n == 0 {
            return Err(BufError::WriteZero);
        }
        written += n;
    }

    let tail = &src[written..];
    if !tail.is_empty() {
        if !storage.is_allocated() {
            allocate_output(storage, stats)?;
        }
        trace!("parking {} unwritten units in the buffer", tail.len());
        buffer_units(storage, tail);
    }
    Ok(())
}

/// Send `[begin, current)` to the handle once.
///
/// Without retry the buffer is considered delivered whatever the handle
/// reports. With retry the unwritten tail moves to the front of the buffer.
pub(crate) fn flush_pending<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
    full_retry: bool,
) -> Result<(), BufError<H::Error>>
where
    H: NativeWrite,
    A: Alignment,
{
    let pending = storage.current();
    if pending == 0 {
        return Ok(());
    }

    let written = handle_write(handle, stats, storage.pending())?;
    if !full_retry || written == pending {
        storage.set_current(0);
        return Ok(());
    }
    if written == 0 {
        return Err(BufError::WriteZero);
    }

    storage.as_mut_slice().copy_within(written..pending, 0);
    storage.set_current(pending - written);
    Ok(())
}

/// Flush until nothing is buffered.
pub(crate) fn flush<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
    full_retry: bool,
) -> Result<(), BufError<H::Error>>
where
    H: NativeWrite,
    A: Alignment,
{
    while storage.current() != 0 {
        flush_pending(storage, handle, stats, full_retry)?;
    }
    Ok(())
}

/// Append one unit, flushing first if the buffer is full.
#[inline]
pub(crate) fn put<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
    full_retry: bool,
    unit: H::Unit,
) -> Result<(), BufError<H::Error>>
where
    H: NativeWrite,
    A: Alignment,
{
    if storage.current() == storage.end() {
        reserve(storage, handle, stats, full_retry)?;
    }
    storage.spare_mut()[0] = unit;
    storage.advance(1);
    Ok(())
}

/// Make sure there is room for at least one unit.
pub(crate) fn reserve<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
    full_retry: bool,
) -> Result<(), BufError<H::Error>>
where
    H: NativeWrite,
    A: Alignment,
{
    if !storage.is_allocated() {
        allocate_output(storage, stats)
    } else if storage.current() == storage.end() {
        flush_pending(storage, handle, stats, full_retry)
    } else {
        Ok(())
    }
}

/// Seek an output handle after flushing everything buffered.
pub(crate) fn seek_output<H, const CAP: usize, A>(
    storage: &mut BufferStorage<H::Unit, CAP, A>,
    handle: &mut H,
    stats: &mut TransferStats,
    full_retry: bool,
    pos: SeekFrom,
) -> Result<u64, BufError<H::Error>>
where
    H: NativeWrite + NativeSeek,
    A: Alignment,
{
    flush(storage, handle, stats, full_retry)?;
    handle.seek(pos).map_err(BufError::Io)
}
