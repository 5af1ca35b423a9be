/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Path resolution and the public filesystem operations (spec.md §4.3,
//! §4.5, §4.6).

use log::{debug, info, warn};

use crate::bat::{BlockAllocator, Cell};
use crate::dir::{self, Region};
use crate::device::BlockDevice;
use crate::entry::{Entry, NO_BLOCK};
use crate::error::{FsError, Result};
use crate::layout::{self, BLOCK_SIZE, SIZE_MASK};
use crate::pathname::PathName;
use crate::stat::Stat;

/// A resolved path: the entry found plus the absolute offset of the slot
/// that holds it (meaningless for the synthetic root entry, which has no
/// persisted slot — see spec.md §4.3 step 1).
pub struct Resolved {
    pub entry: Entry,
    pub slot_offset: u64,
}

pub struct Filesystem<D: BlockDevice> {
    device: D,
}

impl<D: BlockDevice> Filesystem<D> {
    pub fn new(device: D) -> Self {
        Filesystem { device }
    }

    pub fn into_device(self) -> D {
        self.device
    }

    #[cfg(test)]
    pub(crate) fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    // ---- path resolution (spec.md §4.3) --------------------------------

    pub fn get_entry(&mut self, path: &PathName) -> Result<Resolved> {
        if path.is_root() {
            return Ok(Resolved {
                entry: Entry::root(),
                slot_offset: layout::ROOT_OFF,
            });
        }
        if !path.is_valid() {
            return Err(FsError::InvalidArgument(path.to_string()));
        }
        let components: Vec<&str> = path.components().collect();
        let mut region = Region::root();
        for (i, component) in components.iter().enumerate() {
            let found = dir::find_named_entry(&mut self.device, &region, component)?
                .ok_or_else(|| FsError::NotFound(path.clone()))?;
            let (entry, slot_offset) = found;
            let is_last = i + 1 == components.len();
            if is_last {
                // Early return the moment a final component matches: no
                // fallthrough path exists that could yield a stale
                // NOT_FOUND after an inner match already succeeded
                // (spec.md §9 open question 3).
                return Ok(Resolved { entry, slot_offset });
            }
            if !entry.is_dir() {
                return Err(FsError::NotADirectory(path.clone()));
            }
            region = Region::subdir(&mut self.device, entry.first_block)?;
        }
        unreachable!("components is non-empty for any non-root, valid path")
    }

    fn parent_region(&mut self, path: &PathName) -> Result<Region> {
        let resolved = self.get_entry(path)?;
        if !resolved.entry.is_dir() {
            return Err(FsError::NotADirectory(path.clone()));
        }
        if path.is_root() {
            Ok(Region::root())
        } else {
            Region::subdir(&mut self.device, resolved.entry.first_block)
        }
    }

    // ---- attribute & listing (spec.md §4.5) -----------------------------

    pub fn getattr(&mut self, path: &PathName) -> Result<Stat> {
        let resolved = self.get_entry(path)?;
        Ok(if resolved.entry.is_dir() {
            Stat::for_directory()
        } else {
            Stat::for_regular(resolved.entry.file_size())
        })
    }

    pub fn readdir(&mut self, path: &PathName) -> Result<Vec<String>> {
        let resolved = self.get_entry(path)?;
        if !resolved.entry.is_dir() {
            return Err(FsError::NotADirectory(path.clone()));
        }
        let region = if path.is_root() {
            Region::root()
        } else {
            Region::subdir(&mut self.device, resolved.entry.first_block)?
        };
        let mut names = vec![".".to_owned(), "..".to_owned()];
        names.extend(dir::list_names(&mut self.device, &region)?);
        Ok(names)
    }

    // ---- create / unlink (spec.md §4.6.4, §4.6.5) -----------------------

    pub fn create(&mut self, path: &PathName) -> Result<()> {
        let (parent_path, name) = path.split();
        validate_name(&name)?;
        if self.get_entry(path).is_ok() {
            return Err(FsError::Exists(path.clone()));
        }
        let region = self.parent_region(&parent_path)?;
        let slot = dir::find_free_entry(&mut self.device, &region)?;
        dir::write_entry(&mut self.device, slot, &Entry::new_file(name))?;
        info!("created file {path}");
        Ok(())
    }

    pub fn unlink(&mut self, path: &PathName) -> Result<()> {
        let resolved = self.get_entry(path)?;
        if resolved.entry.is_dir() {
            return Err(FsError::IsADirectory(path.clone()));
        }
        BlockAllocator::new(&mut self.device).free_block_chain(resolved.entry.first_block)?;
        dir::write_entry(&mut self.device, resolved.slot_offset, &Entry::free())?;
        info!("unlinked file {path}");
        Ok(())
    }

    // ---- mkdir / rmdir (spec.md §4.4, §4.6.6) ---------------------------

    pub fn mkdir(&mut self, path: &PathName) -> Result<()> {
        let (parent_path, name) = path.split();
        validate_name(&name)?;
        if self.get_entry(path).is_ok() {
            return Err(FsError::Exists(path.clone()));
        }
        let region = self.parent_region(&parent_path)?;
        let slot = dir::find_free_entry(&mut self.device, &region)?;

        // Reserve both blocks before issuing any BAT write (spec.md §9 item
        // 1): the second search excludes the first's index, so failure of
        // the second leaves the BAT completely unchanged.
        let mut alloc = BlockAllocator::new(&mut self.device);
        let b1 = alloc
            .find_free_block(&[])?
            .ok_or(FsError::OutOfSpace)?;
        let b2 = alloc
            .find_free_block(&[b1])?
            .ok_or(FsError::OutOfSpace)?;
        alloc.write_cell(b1, Cell::Next(b2))?;
        alloc.write_cell(b2, Cell::End)?;

        let subdir_region = Region::subdir(&mut self.device, b1)?;
        dir::init_region(&mut self.device, &subdir_region)?;
        dir::write_entry(&mut self.device, slot, &Entry::new_dir(name, b1))?;
        info!("created directory {path} (blocks {b1}, {b2})");
        Ok(())
    }

    pub fn rmdir(&mut self, path: &PathName) -> Result<()> {
        if path.is_root() {
            return Err(FsError::Busy(path.clone()));
        }
        let resolved = self.get_entry(path)?;
        if !resolved.entry.is_dir() {
            return Err(FsError::NotADirectory(path.clone()));
        }
        let region = Region::subdir(&mut self.device, resolved.entry.first_block)?;
        if !dir::check_dir_empty(&mut self.device, &region)? {
            return Err(FsError::NotEmpty(path.clone()));
        }
        BlockAllocator::new(&mut self.device).free_block_chain(resolved.entry.first_block)?;
        dir::write_entry(&mut self.device, resolved.slot_offset, &Entry::free())?;
        info!("removed directory {path}");
        Ok(())
    }

    // ---- read / write / truncate (spec.md §4.6.1 - §4.6.3) --------------

    pub fn read(&mut self, path: &PathName, size: u32, offset: u32) -> Result<Vec<u8>> {
        let resolved = self.get_entry(path)?;
        if resolved.entry.is_dir() {
            return Err(FsError::IsADirectory(path.clone()));
        }
        let file_size = resolved.entry.file_size();
        if offset >= file_size {
            return Ok(Vec::new());
        }
        let to_read = size.min(file_size - offset);
        let mut out = Vec::with_capacity(to_read as usize);

        let mut alloc = BlockAllocator::new(&mut self.device);
        let mut block = resolved.entry.first_block;
        let mut remaining_skip = offset as u64;
        while remaining_skip >= BLOCK_SIZE {
            block = match alloc.chain_next(block)? {
                Cell::Next(n) => n,
                Cell::End | Cell::Empty => return Ok(out),
            };
            remaining_skip -= BLOCK_SIZE;
        }
        let mut in_block_offset = remaining_skip as u64;
        let mut remaining = to_read as u64;
        while remaining > 0 {
            let chunk = (BLOCK_SIZE - in_block_offset).min(remaining);
            let mut buf = vec![0u8; chunk as usize];
            self.device
                .read(&mut buf, layout::block_offset(block) + in_block_offset)?;
            out.extend_from_slice(&buf);
            remaining -= chunk;
            if remaining == 0 {
                break;
            }
            let mut alloc = BlockAllocator::new(&mut self.device);
            block = match alloc.chain_next(block)? {
                Cell::Next(n) => n,
                Cell::End | Cell::Empty => break,
            };
            in_block_offset = 0;
        }
        Ok(out)
    }

    pub fn write(&mut self, path: &PathName, data: &[u8], offset: u32) -> Result<u32> {
        let resolved = self.get_entry(path)?;
        if resolved.entry.is_dir() {
            return Err(FsError::IsADirectory(path.clone()));
        }
        let file_size = resolved.entry.file_size();
        let target_size = file_size.max(
            offset
                .checked_add(data.len() as u32)
                .ok_or(FsError::FileTooBig(u64::MAX))?,
        );
        if target_size > SIZE_MASK {
            return Err(FsError::FileTooBig(target_size as u64));
        }

        let mut first_block = resolved.entry.first_block;
        if first_block == NO_BLOCK {
            let mut alloc = BlockAllocator::new(&mut self.device);
            let b = alloc.allocate_block()?;
            alloc.write_cell(b, Cell::End)?;
            // The block may itself be a hole (offset > 0 on an empty file);
            // zero it so reads before the write point don't surface
            // whatever was previously on disk (spec.md §9 open question 2).
            alloc.zero_block(b)?;
            first_block = b;
        }

        // Walk/extend the chain until the block covering `offset` is
        // reached. Every block allocated here is pure hole — no write data
        // will land in it — so it is zero-filled at link time rather than
        // left with implementation-defined contents (spec.md §9 item 2).
        //
        // If allocation fails partway through, stop immediately and fall
        // through to persisting whatever was linked so far (spec.md §4.6.2
        // step 5, §4.7): no bytes have been written yet in that case.
        let mut block = first_block;
        let mut blocks_to_skip = offset as u64 / BLOCK_SIZE;
        let mut out_of_space = false;
        while blocks_to_skip > 0 && !out_of_space {
            let mut alloc = BlockAllocator::new(&mut self.device);
            block = match alloc.chain_next(block)? {
                Cell::Next(n) => n,
                Cell::End | Cell::Empty => match alloc.allocate_block() {
                    Ok(next) => {
                        alloc.write_cell(block, Cell::Next(next))?;
                        alloc.write_cell(next, Cell::End)?;
                        alloc.zero_block(next)?;
                        next
                    }
                    Err(FsError::OutOfSpace) => {
                        out_of_space = true;
                        block
                    }
                    Err(e) => return Err(e),
                },
            };
            blocks_to_skip -= 1;
        }

        let mut written = 0u32;
        let mut in_block_offset = (offset as u64) % BLOCK_SIZE;
        let mut remaining = if out_of_space { 0 } else { data.len() };
        while remaining > 0 {
            let chunk = ((BLOCK_SIZE - in_block_offset) as usize).min(remaining);
            self.device.write(
                &data[written as usize..written as usize + chunk],
                layout::block_offset(block) + in_block_offset,
            )?;
            written += chunk as u32;
            remaining -= chunk;
            if remaining == 0 {
                break;
            }
            let mut alloc = BlockAllocator::new(&mut self.device);
            block = match alloc.chain_next(block)? {
                Cell::Next(n) => n,
                Cell::End | Cell::Empty => match alloc.allocate_block() {
                    Ok(next) => {
                        alloc.write_cell(block, Cell::Next(next))?;
                        alloc.write_cell(next, Cell::End)?;
                        next
                    }
                    Err(FsError::OutOfSpace) => break,
                    Err(e) => return Err(e),
                },
            };
            in_block_offset = 0;
        }

        // Recompute the achieved size from the chain actually reached,
        // rather than trusting `offset + written`: when the skip/extend
        // loop above runs out of space before any data byte is written,
        // `written` stays 0 and `offset` alone would overstate how far the
        // chain was linked. Same pattern as `truncate`'s grow error path.
        let chain_blocks = self.chain_length(first_block)?;
        let achieved_size = file_size.max((chain_blocks * BLOCK_SIZE).min(target_size as u64) as u32);
        if achieved_size > file_size || first_block != resolved.entry.first_block {
            let mut entry = resolved.entry;
            entry.first_block = first_block;
            entry.set_file_size(achieved_size);
            dir::write_entry(&mut self.device, resolved.slot_offset, &entry)?;
        }
        if (written as usize) < data.len() {
            warn!("write to {path} ran out of space after {written} bytes");
        }
        debug!("wrote {written} bytes to {path} at offset {offset}");
        Ok(written)
    }

    pub fn truncate(&mut self, path: &PathName, size: u32) -> Result<()> {
        if size > SIZE_MASK {
            return Err(FsError::FileTooBig(size as u64));
        }
        let resolved = self.get_entry(path)?;
        if resolved.entry.is_dir() {
            return Err(FsError::IsADirectory(path.clone()));
        }
        let file_size = resolved.entry.file_size();
        let mut entry = resolved.entry;

        if size < file_size {
            self.shrink(&mut entry, size)?;
            entry.set_file_size(size);
            dir::write_entry(&mut self.device, resolved.slot_offset, &entry)?;
        } else if size > file_size {
            match self.grow(&mut entry, size) {
                Ok(()) => {
                    entry.set_file_size(size);
                    dir::write_entry(&mut self.device, resolved.slot_offset, &entry)?;
                }
                Err(FsError::OutOfSpace) => {
                    // Whatever got linked stays reachable from the entry:
                    // persist the size the chain actually reached instead
                    // of the requested one (spec.md §4.7 — partial effects
                    // remain reachable from root).
                    let achieved_blocks = self.chain_length(entry.first_block)?;
                    let achieved = (achieved_blocks * BLOCK_SIZE).min(size as u64) as u32;
                    entry.set_file_size(achieved);
                    dir::write_entry(&mut self.device, resolved.slot_offset, &entry)?;
                    warn!("truncate grow of {path} ran out of space at {achieved} bytes");
                    return Err(FsError::OutOfSpace);
                }
                Err(e) => return Err(e),
            }
        } else {
            dir::write_entry(&mut self.device, resolved.slot_offset, &entry)?;
        }
        Ok(())
    }

    fn shrink(&mut self, entry: &mut Entry, size: u32) -> Result<()> {
        let blocks_needed = size.div_ceil(BLOCK_SIZE as u32);
        if blocks_needed == 0 {
            let mut alloc = BlockAllocator::new(&mut self.device);
            alloc.free_block_chain(entry.first_block)?;
            entry.first_block = NO_BLOCK;
            return Ok(());
        }
        let mut alloc = BlockAllocator::new(&mut self.device);
        let mut tail = entry.first_block;
        for _ in 1..blocks_needed {
            tail = match alloc.chain_next(tail)? {
                Cell::Next(n) => n,
                Cell::End | Cell::Empty => break,
            };
        }
        if let Cell::Next(successor) = alloc.chain_next(tail)? {
            alloc.free_block_chain(successor)?;
        }
        alloc.write_cell(tail, Cell::End)?;
        Ok(())
    }

    fn grow(&mut self, entry: &mut Entry, size: u32) -> Result<()> {
        let mut alloc = BlockAllocator::new(&mut self.device);

        // Track the tail and chain length explicitly in one walk, rather
        // than ending the walk with an ambiguous current/prev pair
        // (spec.md §9 item 4).
        let (mut tail, mut chain_len) = if entry.first_block == NO_BLOCK {
            let b = alloc.allocate_block()?;
            alloc.write_cell(b, Cell::End)?;
            alloc.zero_block(b)?;
            entry.first_block = b;
            (b, 1u64)
        } else {
            let mut current = entry.first_block;
            let mut len = 1u64;
            loop {
                match alloc.chain_next(current)? {
                    Cell::Next(n) => {
                        current = n;
                        len += 1;
                    }
                    Cell::End | Cell::Empty => break,
                }
            }
            (current, len)
        };

        let blocks_needed = size.div_ceil(BLOCK_SIZE as u32) as u64;
        while chain_len < blocks_needed {
            let next = alloc.allocate_block()?;
            alloc.write_cell(tail, Cell::Next(next))?;
            alloc.write_cell(next, Cell::End)?;
            alloc.zero_block(next)?;
            tail = next;
            chain_len += 1;
        }
        Ok(())
    }

    // ---- filesystem checker (new — see SPEC_FULL.md) --------------------

    pub fn fsck(&mut self) -> Result<Vec<String>> {
        let mut violations = Vec::new();
        self.check_region(&Region::root(), "/", &mut violations)?;
        Ok(violations)
    }

    fn check_region(&mut self, region: &Region, path: &str, violations: &mut Vec<String>) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for i in 0..region.capacity {
            let offset = region.slot_offset(i);
            let entry = dir::read_entry(&mut self.device, offset)?;
            if entry.is_free() {
                continue;
            }
            if !seen.insert(entry.filename.clone()) {
                violations.push(format!("duplicate name '{}' under {}", entry.filename, path));
            }
            if entry.is_dir() {
                let sub_path = format!("{}{}/", path, entry.filename);
                let subregion = Region::subdir(&mut self.device, entry.first_block)?;
                self.check_region(&subregion, &sub_path, violations)?;
            } else {
                let chain_len = self.chain_length(entry.first_block)?;
                let expected = entry.file_size().div_ceil(BLOCK_SIZE as u32) as u64;
                if chain_len != expected {
                    violations.push(format!(
                        "{}{}: chain length {} does not match size {} (expected {} blocks)",
                        path, entry.filename, chain_len, entry.file_size(), expected
                    ));
                    warn!("fsck: size/chain mismatch at {}{}", path, entry.filename);
                }
            }
        }
        Ok(())
    }

    fn chain_length(&mut self, first_block: u32) -> Result<u64> {
        if first_block == NO_BLOCK {
            return Ok(0);
        }
        let mut alloc = BlockAllocator::new(&mut self.device);
        let mut len = 1u64;
        let mut block = first_block;
        loop {
            match alloc.chain_next(block)? {
                Cell::Next(n) => {
                    block = n;
                    len += 1;
                }
                Cell::End | Cell::Empty => return Ok(len),
            }
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.len() > Entry::max_name_len() {
        return Err(FsError::NameTooLong(name.to_owned()));
    }
    if name.is_empty() {
        return Err(FsError::InvalidArgument("empty filename".to_owned()));
    }
    Ok(())
}
