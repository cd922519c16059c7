//! End-to-end behaviour of the buffered adapters.
//!
//! These tests cover:
//! - Round trips through output then input buffers around the capacity
//! - Delivery of pending units on drop
//! - Passthrough of large transfers on cold buffers
//! - Flush idempotence and seek invalidation
//! - End-of-stream handling

mod common;

use anyhow::Result;
use bufrs::{InputBuffer, MemoryHandle, OutputBuffer, SeekFrom};
use common::{init_logging, payload, Recorder};

const CAP: usize = 16;

#[test]
fn test_round_trip_around_capacity() -> Result<()> {
    init_logging();

    for len in [0, 1, CAP - 1, CAP, CAP + 1, 3 * CAP, 10 * CAP + 5, 1000] {
        let data = payload(len);

        let mut output = OutputBuffer::<_, CAP>::new(MemoryHandle::empty());
        // Uneven chunks so both the hot and the cold path run.
        for chunk in data.chunks(5) {
            output.write(chunk)?;
        }
        let handle = output.into_inner().map_err(|e| e.into_parts().1)?;
        assert_eq!(handle.as_slice(), data.as_slice(), "write side, len {len}");

        // The writer left the position at the end; read from the start.
        let mut input = InputBuffer::<_, CAP>::new(MemoryHandle::new(handle.into_inner()));
        let mut back = vec![0u8; len];
        let mut filled = 0;
        for step in [3, 7, CAP, 2 * CAP].iter().cycle() {
            if filled == len {
                break;
            }
            let end = (filled + step).min(len);
            let n = input.read(&mut back[filled..end])?;
            assert_eq!(n, end - filled);
            filled = end;
        }
        assert_eq!(back, data, "read side, len {len}");
        assert_eq!(input.read(&mut [0u8; 4])?, 0);
    }
    Ok(())
}

#[test]
fn test_round_trip_wide_units() -> Result<()> {
    let data: Vec<u32> = (0..100).map(|i| i * 0x0101_0101).collect();

    let mut output = OutputBuffer::<_, 8>::new(MemoryHandle::<u32>::empty());
    for chunk in data.chunks(3) {
        output.write(chunk)?;
    }
    let handle = output.into_inner().map_err(|e| e.into_parts().1)?;

    let mut input = InputBuffer::<_, 8>::new(MemoryHandle::new(handle.into_inner()));
    let mut back = vec![0u32; 100];
    assert_eq!(input.read(&mut back)?, 100);
    assert_eq!(back, data);
    Ok(())
}

#[test]
fn test_pending_units_reach_handle_on_drop() {
    init_logging();

    let mut handle = Recorder::default();
    {
        let mut output = OutputBuffer::<_, CAP>::new(&mut handle);
        output.write(b"abc").unwrap();
        output.write(b"def").unwrap();
        assert!(handle_untouched(&output));
    }
    assert_eq!(handle.writes, vec![b"abcdef".to_vec()]);
}

fn handle_untouched(output: &OutputBuffer<&mut Recorder, CAP>) -> bool {
    output.get_ref().writes.is_empty()
}

#[test]
fn test_cold_write_passthrough() {
    let mut output = OutputBuffer::<_, CAP>::new(Recorder::default());
    output.write(&payload(CAP)).unwrap();

    assert!(!output.is_allocated());
    assert_eq!(output.stats().allocations, 0);
    assert_eq!(output.get_ref().writes.len(), 1);
    assert_eq!(output.get_ref().writes[0].len(), CAP);
}

#[test]
fn test_cold_read_passthrough() {
    let data = payload(4 * CAP);
    let mut input = InputBuffer::<_, CAP>::new(Recorder::with_data(&data));

    let mut buf = vec![0u8; 2 * CAP];
    assert_eq!(input.read(&mut buf).unwrap(), 2 * CAP);

    assert!(!input.is_allocated());
    assert_eq!(input.stats().allocations, 0);
    assert_eq!(input.get_ref().reads, vec![2 * CAP]);
    assert_eq!(buf, &data[..2 * CAP]);
}

#[test]
fn test_flush_is_idempotent() {
    let mut output = OutputBuffer::<_, CAP>::new(Recorder::default());
    output.write(b"xyz").unwrap();
    output.flush().unwrap();
    output.flush().unwrap();

    assert_eq!(output.get_ref().writes, vec![b"xyz".to_vec()]);
}

#[test]
fn test_relative_seek_is_corrected_and_invalidates() {
    let data = payload(100);
    let mut input = InputBuffer::<_, CAP>::new(Recorder::with_data(&data));

    let mut buf = [0u8; 5];
    input.read(&mut buf).unwrap();
    assert_eq!(input.unread().len(), CAP - 5);

    let pos = input.seek(SeekFrom::Current(10)).unwrap();
    assert_eq!(pos, 15);
    assert!(input.unread().is_empty());
    assert_eq!(
        input.get_ref().seeks,
        vec![SeekFrom::Current(10 - (CAP as i64 - 5))]
    );

    input.read(&mut buf).unwrap();
    assert_eq!(buf, &data[15..20]);
}

#[test]
fn test_end_of_stream_returns_short_count_then_zero() {
    let data = payload(CAP + 3);
    let mut input = InputBuffer::<_, CAP>::new(Recorder::with_data(&data));

    let mut buf = [0u8; 10];
    assert_eq!(input.read(&mut buf).unwrap(), 10);
    assert_eq!(input.read(&mut buf).unwrap(), 9);
    assert_eq!(&buf[..9], &data[10..]);
    assert_eq!(input.read(&mut buf).unwrap(), 0);
    assert_eq!(input.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_single_unit_puts_flush_in_capacity_chunks() {
    init_logging();

    let text = b"ABCDEFGHIJKLMNOPQRST";
    let mut handle = Recorder::default();
    {
        let mut output = OutputBuffer::<_, 8>::new(&mut handle);
        for &b in text {
            output.put(b).unwrap();
        }
    }

    assert_eq!(handle.writes.len(), 3);
    assert!(handle.writes.iter().all(|w| w.len() <= 8));
    assert_eq!(handle.written(), text);
}

#[test]
fn test_large_write_after_partial_fill() {
    let mut output = OutputBuffer::<_, 8>::new(Recorder::default());
    output.write(b"abc").unwrap();
    output.write(&payload(20)).unwrap();

    let handle = output.into_inner().unwrap();
    // prefix flush, then one direct write of the remainder
    assert_eq!(handle.writes.len(), 2);
    assert_eq!(handle.writes[0].len(), 8);
    assert_eq!(handle.writes[1].len(), 15);

    let mut expected = b"abc".to_vec();
    expected.extend(payload(20));
    assert_eq!(handle.written(), expected);
}
