/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Synthesized attribute record returned by `getattr`.
//!
//! Ownership fields are left for the caller to fill in: process identity is
//! an external collaborator this crate does not model.

use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Directory,
    Regular,
}

#[derive(Debug, Clone)]
pub struct Stat {
    pub kind: Kind,
    pub nlink: u32,
    pub size: u64,
    pub accessed: SystemTime,
    pub modified: SystemTime,
}

impl Stat {
    pub fn for_directory() -> Stat {
        let now = SystemTime::now();
        Stat {
            kind: Kind::Directory,
            nlink: 2,
            size: 0,
            accessed: now,
            modified: now,
        }
    }

    pub fn for_regular(size: u32) -> Stat {
        let now = SystemTime::now();
        Stat {
            kind: Kind::Regular,
            nlink: 1,
            size: size as u64,
            accessed: now,
            modified: now,
        }
    }
}
