/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Directory region: a fixed-capacity array of fixed-size entries.

use crate::bat::{BlockAllocator, Cell};
use crate::device::BlockDevice;
use crate::entry::Entry;
use crate::error::{FsError, Result};
use crate::layout;

/// A directory region is a small, fixed list of block offsets (one for
/// root's flat region, two for a subdirectory's linked chain) plus how many
/// entries fit per block. Slot `i` lives in `blocks[i / entries_per_block]`
/// at intra-block offset `(i % entries_per_block) * ENTRY_SIZE`; entries
/// never straddle a block boundary (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct Region {
    blocks: Vec<u64>,
    entries_per_block: usize,
    pub capacity: usize,
}

impl Region {
    pub fn root() -> Region {
        Region {
            blocks: vec![layout::ROOT_OFF],
            entries_per_block: layout::ROOT_N,
            capacity: layout::ROOT_N,
        }
    }

    /// Resolves a subdirectory's two-block chain via the BAT. Subdirectory
    /// blocks are not assumed to be contiguous on disk, so the second
    /// block's offset is read from `bat[first_block]` rather than computed
    /// by pure arithmetic.
    pub fn subdir<D: BlockDevice>(device: &mut D, first_block: u32) -> Result<Region> {
        let mut alloc = BlockAllocator::new(device);
        let second_block = match alloc.chain_next(first_block)? {
            Cell::Next(n) => n,
            Cell::End | Cell::Empty => {
                return Err(FsError::InvalidArgument(format!(
                    "subdirectory chain at block {first_block} is not two blocks long"
                )));
            }
        };
        Ok(Region {
            blocks: vec![layout::block_offset(first_block), layout::block_offset(second_block)],
            entries_per_block: layout::ENTRIES_PER_BLOCK,
            capacity: layout::DIR_N,
        })
    }

    pub fn slot_offset(&self, index: usize) -> u64 {
        let block = self.blocks[index / self.entries_per_block];
        block + (index % self.entries_per_block) as u64 * layout::ENTRY_SIZE
    }
}

pub fn read_entry<D: BlockDevice>(device: &mut D, offset: u64) -> Result<Entry> {
    let mut buf = vec![0u8; layout::ENTRY_SIZE as usize];
    device.read(&mut buf, offset)?;
    Ok(Entry::decode(&buf))
}

pub fn write_entry<D: BlockDevice>(device: &mut D, offset: u64, entry: &Entry) -> Result<()> {
    device.write(&entry.encode(), offset)?;
    Ok(())
}

/// Linear scan for the first slot with an empty filename.
pub fn find_free_entry<D: BlockDevice>(device: &mut D, region: &Region) -> Result<u64> {
    for i in 0..region.capacity {
        let offset = region.slot_offset(i);
        if read_entry(device, offset)?.is_free() {
            return Ok(offset);
        }
    }
    Err(FsError::OutOfSpace)
}

/// Linear scan for a slot matching `name` byte-for-byte.
pub fn find_named_entry<D: BlockDevice>(
    device: &mut D,
    region: &Region,
    name: &str,
) -> Result<Option<(Entry, u64)>> {
    for i in 0..region.capacity {
        let offset = region.slot_offset(i);
        let entry = read_entry(device, offset)?;
        if !entry.is_free() && entry.filename == name {
            return Ok(Some((entry, offset)));
        }
    }
    Ok(None)
}

/// True iff every slot in the region is free.
pub fn check_dir_empty<D: BlockDevice>(device: &mut D, region: &Region) -> Result<bool> {
    for i in 0..region.capacity {
        let offset = region.slot_offset(i);
        if !read_entry(device, offset)?.is_free() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Every non-empty filename in on-disk slot order, for `readdir`.
pub fn list_names<D: BlockDevice>(device: &mut D, region: &Region) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for i in 0..region.capacity {
        let offset = region.slot_offset(i);
        let entry = read_entry(device, offset)?;
        if !entry.is_free() {
            names.push(entry.filename);
        }
    }
    Ok(names)
}

/// Zero-initializes every slot across a two-block subdirectory region.
pub fn init_region<D: BlockDevice>(device: &mut D, region: &Region) -> Result<()> {
    let free = Entry::free();
    for i in 0..region.capacity {
        write_entry(device, region.slot_offset(i), &free)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemDevice;

    fn device_with_root() -> MemDevice {
        let size = layout::DATA_OFF as usize + layout::BAT_N as usize * layout::BLOCK_SIZE as usize;
        let mut dev = MemDevice::new(size);
        init_region(&mut dev, &Region::root()).unwrap();
        dev
    }

    #[test]
    fn free_entry_is_first_slot_on_empty_region() {
        let mut dev = device_with_root();
        let region = Region::root();
        assert_eq!(find_free_entry(&mut dev, &region).unwrap(), region.slot_offset(0));
    }

    #[test]
    fn named_lookup_finds_written_entry() {
        let mut dev = device_with_root();
        let region = Region::root();
        let entry = Entry::new_file("a".to_owned());
        write_entry(&mut dev, region.slot_offset(0), &entry).unwrap();
        let (found, offset) = find_named_entry(&mut dev, &region, "a").unwrap().unwrap();
        assert_eq!(found, entry);
        assert_eq!(offset, region.slot_offset(0));
        assert!(find_named_entry(&mut dev, &region, "b").unwrap().is_none());
    }

    #[test]
    fn check_dir_empty_reports_occupancy() {
        let mut dev = device_with_root();
        let region = Region::root();
        assert!(check_dir_empty(&mut dev, &region).unwrap());
        write_entry(&mut dev, region.slot_offset(3), &Entry::new_file("x".to_owned())).unwrap();
        assert!(!check_dir_empty(&mut dev, &region).unwrap());
    }

    #[test]
    fn list_names_preserves_slot_order() {
        let mut dev = device_with_root();
        let region = Region::root();
        write_entry(&mut dev, region.slot_offset(5), &Entry::new_file("z".to_owned())).unwrap();
        write_entry(&mut dev, region.slot_offset(1), &Entry::new_file("a".to_owned())).unwrap();
        assert_eq!(list_names(&mut dev, &region).unwrap(), vec!["a", "z"]);
    }
}
