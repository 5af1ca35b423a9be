/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Interactive line-oriented shell driving a [`Filesystem`] over stdin.
//!
//! One command per line, space-separated, mirroring a minimal POSIX shell:
//! `ls`, `cat`, `write`, `create`, `mkdir`, `rm`, `rmdir`, `truncate`,
//! `stat`, `quit`. Errors are printed and do not end the session.

use std::io::{self, BufRead, Write};

use log::info;

use tinyfs::config::Config;
use tinyfs::device::BlockDevice;
use tinyfs::fs::Filesystem;
use tinyfs::stat::Kind;

pub fn run<D: BlockDevice>(fs: &mut Filesystem<D>, config: &Config) -> io::Result<()> {
    let stdin = io::stdin();
    print!("tinyfs> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            print!("tinyfs> ");
            io::stdout().flush()?;
            continue;
        }
        match dispatch(fs, config, &words) {
            Ok(Some(done)) if done => break,
            Ok(_) => {}
            Err(msg) => println!("error: {msg}"),
        }
        print!("tinyfs> ");
        io::stdout().flush()?;
    }
    Ok(())
}

/// Returns `Ok(Some(true))` when the shell should exit.
fn dispatch<D: BlockDevice>(
    fs: &mut Filesystem<D>,
    config: &Config,
    words: &[&str],
) -> Result<Option<bool>, String> {
    match words {
        ["quit"] | ["exit"] => return Ok(Some(true)),
        ["ls", path] => {
            let names = fs.readdir(&(*path).into()).map_err(|e| e.to_string())?;
            println!("{}", names.join("  "));
        }
        ["stat", path] => {
            let stat = fs.getattr(&(*path).into()).map_err(|e| e.to_string())?;
            let kind = match stat.kind {
                Kind::Directory => "directory",
                Kind::Regular => "regular",
            };
            println!("kind={kind} nlink={} size={}", stat.nlink, stat.size);
            if stat.kind == Kind::Regular {
                let preview_len = config.preview_bytes.min(stat.size as u32);
                let preview = fs
                    .read(&(*path).into(), preview_len, 0)
                    .map_err(|e| e.to_string())?;
                println!("preview: {}", String::from_utf8_lossy(&preview));
            }
        }
        ["cat", path] => {
            let stat = fs.getattr(&(*path).into()).map_err(|e| e.to_string())?;
            let data = fs
                .read(&(*path).into(), stat.size as u32, 0)
                .map_err(|e| e.to_string())?;
            println!("{}", String::from_utf8_lossy(&data));
        }
        ["write", path, offset, data @ ..] => {
            let offset: u32 = offset.parse().map_err(|_| "bad offset".to_owned())?;
            let text = data.join(" ");
            let n = fs
                .write(&(*path).into(), text.as_bytes(), offset)
                .map_err(|e| e.to_string())?;
            println!("wrote {n} bytes");
        }
        ["create", path] => {
            fs.create(&(*path).into()).map_err(|e| e.to_string())?;
            info!("shell: created {path}");
        }
        ["mkdir", path] => {
            fs.mkdir(&(*path).into()).map_err(|e| e.to_string())?;
        }
        ["rm", path] => {
            fs.unlink(&(*path).into()).map_err(|e| e.to_string())?;
        }
        ["rmdir", path] => {
            fs.rmdir(&(*path).into()).map_err(|e| e.to_string())?;
        }
        ["truncate", path, size] => {
            let size: u32 = size.parse().map_err(|_| "bad size".to_owned())?;
            fs.truncate(&(*path).into(), size).map_err(|e| e.to_string())?;
        }
        _ => println!("unrecognized command: {}", words.join(" ")),
    }
    Ok(None)
}
