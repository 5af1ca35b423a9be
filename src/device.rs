/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Byte-addressed block device contract.
//!
//! Everything above this layer addresses the device by absolute byte
//! offset; neither operation here knows about blocks, entries, or chains.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

pub trait BlockDevice {
    /// Copies exactly `dst.len()` bytes from device offset `off` into `dst`.
    fn read(&mut self, dst: &mut [u8], off: u64) -> io::Result<()>;

    /// Persists exactly `src.len()` bytes at device offset `off`.
    fn write(&mut self, src: &[u8], off: u64) -> io::Result<()>;
}

/// The production device: a single image file addressed by absolute offset.
pub struct FileDevice {
    file: File,
}

impl FileDevice {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::options().read(true).write(true).open(path)?;
        Ok(FileDevice { file })
    }
}

impl BlockDevice for FileDevice {
    fn read(&mut self, dst: &mut [u8], off: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(off))?;
        self.file.read_exact(dst)
    }

    fn write(&mut self, src: &[u8], off: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(off))?;
        self.file.write_all(src)
    }
}

/// An in-memory device used by tests and by callers that do not yet have a
/// backing file. Grows lazily to cover whatever offset is touched.
pub struct MemDevice {
    bytes: Vec<u8>,
}

impl MemDevice {
    pub fn new(size: usize) -> Self {
        MemDevice {
            bytes: vec![0u8; size],
        }
    }
}

impl BlockDevice for MemDevice {
    fn read(&mut self, dst: &mut [u8], off: u64) -> io::Result<()> {
        let off = off as usize;
        let end = off
            .checked_add(dst.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "offset overflow"))?;
        if end > self.bytes.len() {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "read past end of device"));
        }
        dst.copy_from_slice(&self.bytes[off..end]);
        Ok(())
    }

    fn write(&mut self, src: &[u8], off: u64) -> io::Result<()> {
        let off = off as usize;
        let end = off
            .checked_add(src.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "offset overflow"))?;
        if end > self.bytes.len() {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "write past end of device"));
        }
        self.bytes[off..end].copy_from_slice(src);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_device_round_trips() {
        let mut dev = MemDevice::new(64);
        dev.write(b"hello", 8).unwrap();
        let mut buf = [0u8; 5];
        dev.read(&mut buf, 8).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn mem_device_rejects_out_of_range() {
        let mut dev = MemDevice::new(8);
        let mut buf = [0u8; 4];
        assert!(dev.read(&mut buf, 6).is_err());
    }
}
