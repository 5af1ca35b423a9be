/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! End-to-end scenarios against a real file-backed image, exercising the
//! literal walkthroughs enumerated in spec.md §8.

use std::fs::File;
use std::io::Write as _;

use tempfile::tempdir;
use tinyfs::device::FileDevice;
use tinyfs::fixture;
use tinyfs::fs::Filesystem;
use tinyfs::FsError;

fn fresh_image() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("image.bin");
    {
        let mut file = File::create(&path).unwrap();
        file.write_all(&vec![0u8; fixture::device_size()]).unwrap();
    }
    let mut device = FileDevice::open(&path).unwrap();
    fixture::init_blank(&mut device).unwrap();
    (dir, path)
}

fn open(path: &std::path::Path) -> Filesystem<FileDevice> {
    Filesystem::new(FileDevice::open(path).unwrap())
}

#[test]
fn scenario_create_write_read() {
    let (_dir, path) = fresh_image();
    let mut fs = open(&path);

    fs.create(&"/a".into()).unwrap();
    let stat = fs.getattr(&"/a".into()).unwrap();
    assert_eq!(stat.size, 0);

    let n = fs.write(&"/a".into(), b"hello", 0).unwrap();
    assert_eq!(n, 5);

    let data = fs.read(&"/a".into(), 10, 0).unwrap();
    assert_eq!(data, b"hello");
    assert_eq!(fs.getattr(&"/a".into()).unwrap().size, 5);
}

#[test]
fn scenario_mkdir_readdir_rmdir() {
    let (_dir, path) = fresh_image();
    let mut fs = open(&path);

    fs.mkdir(&"/d".into()).unwrap();
    fs.create(&"/d/f".into()).unwrap();
    assert_eq!(fs.readdir(&"/d".into()).unwrap(), vec![".", "..", "f"]);

    assert_eq!(fs.rmdir(&"/d".into()), Err(FsError::NotEmpty("/d".into())));

    fs.unlink(&"/d/f".into()).unwrap();
    fs.rmdir(&"/d".into()).unwrap();
    assert_eq!(fs.get_entry(&"/d".into()).unwrap_err(), FsError::NotFound("/d".into()));
}

#[test]
fn scenario_truncate_grow_is_zero_filled() {
    let (_dir, path) = fresh_image();
    let mut fs = open(&path);

    fs.create(&"/big".into()).unwrap();
    fs.truncate(&"/big".into(), 1500).unwrap();

    let data = fs.read(&"/big".into(), 1500, 0).unwrap();
    assert_eq!(data.len(), 1500);
    assert!(data.iter().all(|&b| b == 0));
}

#[test]
fn scenario_write_then_truncate_shrink() {
    let (_dir, path) = fresh_image();
    let mut fs = open(&path);

    fs.create(&"/x".into()).unwrap();
    let payload = vec![b'A'; 513];
    let n = fs.write(&"/x".into(), &payload, 0).unwrap();
    assert_eq!(n, 513);

    fs.truncate(&"/x".into(), 100).unwrap();
    let data = fs.read(&"/x".into(), 1000, 0).unwrap();
    assert_eq!(data.len(), 100);
    assert!(data.iter().all(|&b| b == b'A'));
}

#[test]
fn scenario_path_through_file_is_not_a_directory() {
    let (_dir, path) = fresh_image();
    let mut fs = open(&path);

    fs.mkdir(&"/d".into()).unwrap();
    fs.create(&"/d/a".into()).unwrap();
    assert_eq!(
        fs.get_entry(&"/d/a/b".into()).unwrap_err(),
        FsError::NotADirectory("/d/a/b".into())
    );
}

#[test]
fn scenario_rmdir_root_is_busy() {
    let (_dir, path) = fresh_image();
    let mut fs = open(&path);
    assert_eq!(fs.rmdir(&"/".into()), Err(FsError::Busy("/".into())));
}

#[test]
fn scenario_write_with_offset_past_eof_extends_and_zero_fills_hole() {
    let (_dir, path) = fresh_image();
    let mut fs = open(&path);

    fs.create(&"/h".into()).unwrap();
    fs.write(&"/h".into(), b"tail", 520).unwrap();

    let gap = fs.read(&"/h".into(), 520, 0).unwrap();
    assert_eq!(gap.len(), 520);
    assert!(gap.iter().all(|&b| b == 0));

    let tail = fs.read(&"/h".into(), 4, 520).unwrap();
    assert_eq!(tail, b"tail");
}

#[test]
fn scenario_create_unlink_restores_slot_occupancy() {
    let (_dir, path) = fresh_image();
    let mut fs = open(&path);

    fs.create(&"/a".into()).unwrap();
    fs.unlink(&"/a".into()).unwrap();
    fs.create(&"/b".into()).unwrap();

    assert_eq!(fs.readdir(&"/".into()).unwrap(), vec![".", "..", "b"]);
}
