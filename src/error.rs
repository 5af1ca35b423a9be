/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use thiserror::Error;

use crate::pathname::PathName;

pub type Result<T> = std::result::Result<T, FsError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FsError {
    #[error("'{0}' not found")]
    NotFound(PathName),
    #[error("'{0}' is not a directory")]
    NotADirectory(PathName),
    #[error("'{0}' is a directory")]
    IsADirectory(PathName),
    #[error("'{0}' already exists")]
    Exists(PathName),
    #[error("directory '{0}' is not empty")]
    NotEmpty(PathName),
    #[error("no free block or slot available")]
    OutOfSpace,
    #[error("filename '{0}' exceeds the maximum length")]
    NameTooLong(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("size {0} exceeds the maximum regular file size")]
    FileTooBig(u64),
    #[error("'{0}' is busy and cannot be removed")]
    Busy(PathName),
    #[error("out of memory while resolving '{0}'")]
    OutOfMemory(PathName),
    #[error("device I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FsError {
    fn from(err: std::io::Error) -> Self {
        FsError::Io(err.to_string())
    }
}
