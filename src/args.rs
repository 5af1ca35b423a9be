/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file in TOML format
    #[arg(long, default_value_t = String::from("./config.toml"))]
    pub config_path: String,

    #[clap(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
#[clap(rename_all = "kebab_case")]
pub enum Mode {
    /// Open an interactive line-oriented shell against an image
    Shell {
        /// Path to the block device image file; falls back to the
        /// configuration file's `image_path` when omitted
        #[arg(short, long)]
        image: Option<String>,
    },
    /// Run the offline invariant checker against an image
    Check {
        /// Path to the block device image file; falls back to the
        /// configuration file's `image_path` when omitted
        #[arg(short, long)]
        image: Option<String>,
    },
}
