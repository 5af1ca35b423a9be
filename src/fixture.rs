/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Minimal blank-image initializer used by tests.
//!
//! Formatting a fresh image's on-disk layout is an external concern this
//! crate's public operations do not perform — callers are assumed to start
//! from an already-formatted image. Tests still need *some* way to produce
//! a valid starting image; this helper builds one in memory, scoped to
//! test fixtures only.

use crate::bat::{BlockAllocator, Cell};
use crate::device::BlockDevice;
use crate::dir::{self, Region};
use crate::error::Result;
use crate::layout;

pub fn device_size() -> usize {
    layout::DATA_OFF as usize + layout::BAT_N as usize * layout::BLOCK_SIZE as usize
}

/// Initializes every root directory slot to free and every BAT cell to
/// `Empty`, matching what a real `mkfs` would leave behind for this layout.
pub fn init_blank<D: BlockDevice>(device: &mut D) -> Result<()> {
    dir::init_region(device, &Region::root())?;
    let mut alloc = BlockAllocator::new(device);
    for i in 0..layout::BAT_N {
        alloc.write_cell(i, Cell::Empty)?;
    }
    Ok(())
}
