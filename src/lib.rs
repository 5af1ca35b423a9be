/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A small persistent filesystem over a fixed-size block device image.
//!
//! The core is a hierarchical namespace of directories and regular files
//! built on three hand-coded on-disk structures: a block-allocation table
//! (a singly linked free/chain map), fixed-size directory-entry tables, and
//! the entries themselves. There is no in-memory cache, no journal, and no
//! concurrency control — every public [`fs::Filesystem`] method runs to
//! completion against the device before returning.

pub mod bat;
pub mod check;
pub mod config;
pub mod device;
pub mod dir;
pub mod entry;
pub mod error;
pub mod fixture;
pub mod fs;
pub mod layout;
pub mod pathname;
pub mod stat;

pub use device::{BlockDevice, FileDevice, MemDevice};
pub use error::{FsError, Result};
pub use fs::Filesystem;
pub use pathname::PathName;
