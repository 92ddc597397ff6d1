use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use bfs::{Config, FileSystem, Geometry};
use block_dev::BlockDevice;
use vfs::{OpenFlag, Whence};

use crate::BlockFile;

const BLOCKS: u32 = 128;

fn image(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bfs-{}-{tag}.img", std::process::id()))
}

#[test]
fn image_round_trip() {
    let path = image("round-trip");
    let text = "bfs on a host file\n".repeat(60);

    {
        let mut fs = FileSystem::format(
            Arc::new(BlockFile::create(&path, BLOCKS as u64).unwrap()),
            Geometry::new(BLOCKS, 32),
            Config::default(),
        )
        .unwrap();
        let fd = fs.create("notes").unwrap();
        fs.write(fd, text.as_bytes()).unwrap();
        fs.close(fd).unwrap();
        fs.sync();
    }

    {
        let block_file = Arc::new(BlockFile::open(&path).unwrap());
        let mut fs = FileSystem::mount(block_file, Config::default()).unwrap();
        let fd = fs.open("notes", OpenFlag::existing()).unwrap();
        let mut buf = vec![0u8; text.len() + 100];
        assert_eq!(text.len(), fs.read(fd, &mut buf).unwrap());
        assert_eq!(text.as_bytes(), &buf[..text.len()]);

        fs.seek(fd, 0, Whence::End).unwrap();
        assert_eq!(0, fs.read(fd, &mut buf).unwrap());
    }

    fs::remove_file(&path).unwrap();
}

#[test]
fn image_reports_its_size() {
    let path = image("size");
    let block_file = Arc::new(BlockFile::create(&path, BLOCKS as u64).unwrap());
    assert_eq!(Some(BLOCKS as usize), block_file.block_count());

    let too_big = Geometry::new(BLOCKS + 1, 32);
    assert_eq!(
        Err(vfs::Error::InvalidArgument),
        FileSystem::format(block_file, too_big, Config::default()).map(|_| ())
    );

    fs::remove_file(&path).unwrap();
}
