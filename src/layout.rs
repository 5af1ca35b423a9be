/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Fixed on-disk layout constants.
//!
//! Every offset elsewhere in the crate is computed from these values; no
//! other module is allowed to hard-code a region offset.

/// Size in bytes of one data block and one directory-region unit.
pub const BLOCK_SIZE: u64 = 512;

/// Number of entries the root directory region holds.
pub const ROOT_N: usize = 128;

/// Maximum filename length including the trailing NUL.
pub const FILENAME_MAX: usize = 32;

/// Size in bytes of one directory entry record: filename + first_block + size.
pub const ENTRY_SIZE: u64 = FILENAME_MAX as u64 + 4 + 4;

/// How many whole entries fit in one block. Entries never straddle a block
/// boundary, so this is a floor division.
pub const ENTRIES_PER_BLOCK: usize = (BLOCK_SIZE / ENTRY_SIZE) as usize;

/// Number of entries a subdirectory's two-block region holds (spec.md §4.4:
/// `DIR_N * sizeof(entry)` must fit in two blocks).
pub const DIR_N: usize = ENTRIES_PER_BLOCK * 2;

/// Number of blocks in the data region / cells in the block-allocation table.
pub const BAT_N: u32 = 4096;

/// High bit of the entry size field: set for directories.
pub const DIRECTORY_FLAG: u32 = 0x8000_0000;

/// Low 31 bits of the entry size field: byte size of a regular file.
pub const SIZE_MASK: u32 = 0x7FFF_FFFF;

/// Byte offset of the root directory region.
pub const ROOT_OFF: u64 = 0;

/// Byte offset of the block-allocation table.
pub const BAT_OFF: u64 = ROOT_OFF + ROOT_N as u64 * ENTRY_SIZE;

/// Size in bytes of one block-allocation table cell.
pub const BAT_CELL_SIZE: u64 = 4;

/// Byte offset of the data region.
pub const DATA_OFF: u64 = BAT_OFF + BAT_N as u64 * BAT_CELL_SIZE;

/// Raw sentinel stored in a BAT cell for a free block.
pub const RAW_EMPTY: u32 = u32::MAX;

/// Raw sentinel stored in a BAT cell for a chain terminator.
pub const RAW_END: u32 = u32::MAX - 1;

/// Absolute byte offset of data block `index`.
pub fn block_offset(index: u32) -> u64 {
    DATA_OFF + index as u64 * BLOCK_SIZE
}

/// Absolute byte offset of BAT cell `index`.
pub fn bat_cell_offset(index: u32) -> u64 {
    BAT_OFF + index as u64 * BAT_CELL_SIZE
}
