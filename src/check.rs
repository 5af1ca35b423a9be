/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Offline invariant checker.
//!
//! Walks a device image read-only and reports violations (duplicate names,
//! size/chain-length mismatches) rather than asserting or panicking — this
//! is meant to be run on demand against an existing image, not after every
//! mutating call.

use crate::device::BlockDevice;
use crate::error::Result;
use crate::fs::Filesystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsckReport {
    pub violations: Vec<String>,
}

impl FsckReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn run<D: BlockDevice>(fs: &mut Filesystem<D>) -> Result<FsckReport> {
    Ok(FsckReport {
        violations: fs.fsck()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemDevice;
    use crate::dir;
    use crate::fixture;

    fn fresh_fs() -> Filesystem<MemDevice> {
        let mut dev = MemDevice::new(fixture::device_size());
        fixture::init_blank(&mut dev).unwrap();
        Filesystem::new(dev)
    }

    #[test]
    fn clean_image_has_no_violations() {
        let mut fs = fresh_fs();
        fs.create(&"/a".into()).unwrap();
        fs.write(&"/a".into(), b"hello", 0).unwrap();
        let report = run(&mut fs).unwrap();
        assert!(report.is_clean(), "{:?}", report.violations);
    }

    #[test]
    fn detects_size_chain_mismatch() {
        let mut fs = fresh_fs();
        fs.create(&"/a".into()).unwrap();
        fs.write(&"/a".into(), b"hello", 0).unwrap();
        // Directly corrupt the on-disk entry's size field without touching
        // the chain, simulating on-disk corruption fsck should catch.
        let resolved = fs.get_entry(&"/a".into()).unwrap();
        let mut corrupt = resolved.entry.clone();
        corrupt.set_file_size(10_000);
        dir::write_entry(fs.device_mut(), resolved.slot_offset, &corrupt).unwrap();
        let report = run(&mut fs).unwrap();
        assert!(!report.is_clean());
    }
}
