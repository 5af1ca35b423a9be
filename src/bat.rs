/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Block-allocation table: scan, allocate, free, and walk chains.

use log::debug;

use crate::device::BlockDevice;
use crate::error::{FsError, Result};
use crate::layout::{self, BAT_N};

/// Tagged view of a raw BAT cell (`Empty`, `End`, or `Next(index)`). The
/// on-disk encoding still stores the raw sentinels; this type exists at the
/// API boundary only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    End,
    Next(u32),
}

impl Cell {
    fn decode(raw: u32) -> Cell {
        match raw {
            layout::RAW_EMPTY => Cell::Empty,
            layout::RAW_END => Cell::End,
            idx => Cell::Next(idx),
        }
    }

    fn encode(self) -> u32 {
        match self {
            Cell::Empty => layout::RAW_EMPTY,
            Cell::End => layout::RAW_END,
            Cell::Next(idx) => idx,
        }
    }
}

pub struct BlockAllocator<'a, D: BlockDevice> {
    device: &'a mut D,
}

impl<'a, D: BlockDevice> BlockAllocator<'a, D> {
    pub fn new(device: &'a mut D) -> Self {
        BlockAllocator { device }
    }

    pub fn read_cell(&mut self, index: u32) -> Result<Cell> {
        let mut buf = [0u8; 4];
        self.device.read(&mut buf, layout::bat_cell_offset(index))?;
        Ok(Cell::decode(u32::from_le_bytes(buf)))
    }

    pub fn write_cell(&mut self, index: u32, cell: Cell) -> Result<()> {
        self.device
            .write(&cell.encode().to_le_bytes(), layout::bat_cell_offset(index))?;
        Ok(())
    }

    /// Linear scan from index 0 for the first `Empty` cell, excluding any
    /// index already present in `reserved` (used by `create_subdir` to
    /// reserve two blocks without either search picking the other).
    pub fn find_free_block(&mut self, reserved: &[u32]) -> Result<Option<u32>> {
        for i in 0..BAT_N {
            if reserved.contains(&i) {
                continue;
            }
            if self.read_cell(i)? == Cell::Empty {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Finds a free block but does not mark it in the BAT. The caller must
    /// link it (write `End` or a successor index) before returning to a
    /// public operation, so a block is never observably half-allocated.
    pub fn allocate_block(&mut self) -> Result<u32> {
        self.find_free_block(&[])?.ok_or(FsError::OutOfSpace)
    }

    /// Walks the chain from `start`, freeing every cell back to `Empty`.
    /// A no-op when `start` is `End` or already `Empty`: `start` in that
    /// case is a sentinel, not a block index, so there is nothing to read
    /// or write.
    pub fn free_block_chain(&mut self, start: u32) -> Result<()> {
        if start == layout::RAW_END || start == layout::RAW_EMPTY {
            return Ok(());
        }
        let mut current = start;
        loop {
            let next = self.read_cell(current)?;
            self.write_cell(current, Cell::Empty)?;
            debug!("freed block {current}");
            match next {
                Cell::Next(n) => current = n,
                Cell::End | Cell::Empty => return Ok(()),
            }
        }
    }

    pub fn chain_next(&mut self, block: u32) -> Result<Cell> {
        self.read_cell(block)
    }

    /// Zero-fills a data block. Used by truncate-grow and by write when
    /// filling a hole.
    pub fn zero_block(&mut self, index: u32) -> Result<()> {
        let zeros = vec![0u8; layout::BLOCK_SIZE as usize];
        self.device.write(&zeros, layout::block_offset(index))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemDevice;

    fn fresh_device() -> MemDevice {
        let size = layout::DATA_OFF as usize + layout::BAT_N as usize * layout::BLOCK_SIZE as usize;
        let mut dev = MemDevice::new(size);
        // Initialize every BAT cell to Empty.
        let mut alloc = BlockAllocator::new(&mut dev);
        for i in 0..BAT_N {
            alloc.write_cell(i, Cell::Empty).unwrap();
        }
        dev
    }

    #[test]
    fn allocate_picks_lowest_free_index() {
        let mut dev = fresh_device();
        let mut alloc = BlockAllocator::new(&mut dev);
        assert_eq!(alloc.allocate_block().unwrap(), 0);
    }

    #[test]
    fn out_of_space_when_no_free_cell() {
        let mut dev = fresh_device();
        let mut alloc = BlockAllocator::new(&mut dev);
        for i in 0..BAT_N {
            alloc.write_cell(i, Cell::End).unwrap();
        }
        assert_eq!(alloc.find_free_block(&[]).unwrap(), None);
        assert_eq!(alloc.allocate_block(), Err(FsError::OutOfSpace));
    }

    #[test]
    fn free_chain_walks_and_clears() {
        let mut dev = fresh_device();
        let mut alloc = BlockAllocator::new(&mut dev);
        alloc.write_cell(0, Cell::Next(1)).unwrap();
        alloc.write_cell(1, Cell::Next(2)).unwrap();
        alloc.write_cell(2, Cell::End).unwrap();
        alloc.free_block_chain(0).unwrap();
        assert_eq!(alloc.read_cell(0).unwrap(), Cell::Empty);
        assert_eq!(alloc.read_cell(1).unwrap(), Cell::Empty);
        assert_eq!(alloc.read_cell(2).unwrap(), Cell::Empty);
    }

    #[test]
    fn free_chain_on_end_is_noop() {
        let mut dev = fresh_device();
        let mut alloc = BlockAllocator::new(&mut dev);
        alloc.write_cell(5, Cell::End).unwrap();
        alloc.free_block_chain(5).unwrap();
        assert_eq!(alloc.read_cell(5).unwrap(), Cell::End);
    }

    #[test]
    fn reserved_indices_are_skipped() {
        let mut dev = fresh_device();
        let mut alloc = BlockAllocator::new(&mut dev);
        let first = alloc.find_free_block(&[]).unwrap().unwrap();
        let second = alloc.find_free_block(&[first]).unwrap().unwrap();
        assert_ne!(first, second);
    }
}
