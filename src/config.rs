/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! TOML-deserialized configuration for the CLI binary.
//!
//! The library itself takes no configuration — every public [`crate::fs::Filesystem`]
//! method is parameterized only by the device and the call arguments — this
//! struct exists purely for the binary, the way the teacher's own `Config`
//! threads CLI-level knobs through `src/main.rs`.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    /// Level passed to `log::set_max_level` after `log4rs::init_file` loads
    /// the appender layout from `log4rs.yml`; lets an operator raise or
    /// lower verbosity without touching the appender config itself.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Default image path used when `--image` is not given on the command line.
    #[serde(default = "default_image_path")]
    pub image_path: String,
    /// Number of bytes shown by `shell`'s `stat` command when printing a
    /// preview of a regular file's contents; purely a display knob.
    #[serde(default = "default_preview_bytes")]
    pub preview_bytes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            image_path: default_image_path(),
            preview_bytes: default_preview_bytes(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_image_path() -> String {
    "./tinyfs.img".to_owned()
}

fn default_preview_bytes() -> u32 {
    64
}
