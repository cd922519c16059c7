//! Shared test handles.

#![allow(dead_code)]

use bufrs::{Handle, NativeRead, NativeSeek, NativeWrite, SeekFrom};
use std::io;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Byte handle that records the size of every call it receives.
#[derive(Debug, Default)]
pub struct Recorder {
    pub data: Vec<u8>,
    pub pos: usize,
    pub reads: Vec<usize>,
    pub writes: Vec<Vec<u8>>,
    pub seeks: Vec<SeekFrom>,
}

impl Recorder {
    pub fn with_data(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            ..Default::default()
        }
    }

    pub fn written(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

impl Handle for Recorder {
    type Unit = u8;
    type Error = io::Error;
}

impl NativeRead for Recorder {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        self.reads.push(dst.len());
        let n = dst.len().min(self.data.len().saturating_sub(self.pos));
        dst[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl NativeWrite for Recorder {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        self.writes.push(src.to_vec());
        Ok(src.len())
    }
}

impl NativeSeek for Recorder {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seeks.push(pos);
        let target = match pos {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::Current(n) => self.pos as i64 + n,
            SeekFrom::End(n) => self.data.len() as i64 + n,
        };
        if target < 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "negative seek"));
        }
        self.pos = target as usize;
        Ok(target as u64)
    }
}

/// Deterministic test payload.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}
