/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use log::{error, info, LevelFilter};

use args::{Args, Mode};
use tinyfs::check;
use tinyfs::config::Config;
use tinyfs::device::FileDevice;
use tinyfs::fs::Filesystem;

mod args;
mod shell;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            error!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let _ = log4rs::init_file("log4rs.yml", Default::default());
    info!("starting up");

    let config: Config = if Path::new(&args.config_path).exists() {
        let raw = fs::read_to_string(&args.config_path)
            .with_context(|| format!("failed to read configuration file {}", args.config_path))?;
        toml::from_str(&raw).with_context(|| "failed to parse configuration")?
    } else {
        Config::default()
    };

    if let Ok(level) = LevelFilter::from_str(&config.log_level) {
        log::set_max_level(level);
    }

    match args.mode {
        Mode::Shell { image } => {
            let image = image.unwrap_or_else(|| config.image_path.clone());
            info!("opening image {image} for interactive shell");
            let device =
                FileDevice::open(Path::new(&image)).with_context(|| format!("failed to open image {image}"))?;
            let mut fs = Filesystem::new(device);
            shell::run(&mut fs, &config).with_context(|| "shell session failed")?;
            Ok(ExitCode::SUCCESS)
        }
        Mode::Check { image } => {
            let image = image.unwrap_or_else(|| config.image_path.clone());
            info!("checking image {image}");
            let device =
                FileDevice::open(Path::new(&image)).with_context(|| format!("failed to open image {image}"))?;
            let mut fs = Filesystem::new(device);
            let report = check::run(&mut fs).with_context(|| "fsck failed")?;
            if report.is_clean() {
                println!("clean");
                Ok(ExitCode::SUCCESS)
            } else {
                for violation in &report.violations {
                    println!("{violation}");
                }
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
