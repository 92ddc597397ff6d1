mod common;

use std::sync::Arc;

use bfs::{Config, FileSystem, Geometry, MAX_FILE_BLOCKS, NAME_MAX_LEN};
use bfs_fuse::RamDisk;
use vfs::{Error, InodeKind, OpenFlag, Whence};

use common::{fresh, fresh_with, pattern};

#[test]
fn reopen_shares_cursor() {
    let (_disk, mut fs) = fresh();
    let a = fs.create("shared").unwrap();
    let b = fs.open("shared", OpenFlag::existing()).unwrap();
    assert_eq!(a, b);
    assert_eq!(2, fs.oft().refcount(a).unwrap());

    fs.write(a, b"abc").unwrap();
    assert_eq!(3, fs.tell(b).unwrap());

    fs.close(a).unwrap();
    assert_eq!(3, fs.tell(b).unwrap());

    fs.close(b).unwrap();
    assert_eq!(Err(Error::BadHandle), fs.tell(b));
    assert_eq!(Err(Error::BadHandle), fs.close(b));
    assert!(fs.oft().is_empty());
}

#[test]
fn distinct_files_get_distinct_handles() {
    let (_disk, mut fs) = fresh();
    let a = fs.create("a").unwrap();
    let b = fs.create("b").unwrap();
    assert_ne!(a, b);

    fs.write(a, b"first").unwrap();
    fs.write(b, b"second file").unwrap();
    assert_eq!(5, fs.tell(a).unwrap());
    assert_eq!(11, fs.tell(b).unwrap());

    // 新打开的文件游标从零开始
    fs.close(a).unwrap();
    let a = fs.open("a", OpenFlag::existing()).unwrap();
    assert_eq!(0, fs.tell(a).unwrap());

    let mut buf = [0u8; 16];
    assert_eq!(5, fs.read(a, &mut buf).unwrap());
    assert_eq!(b"first", &buf[..5]);
}

#[test]
fn open_missing_file() {
    let (_disk, mut fs) = fresh();
    assert_eq!(Err(Error::NotFound), fs.open("nope", OpenFlag::existing()));
    assert_eq!(Err(Error::NotFound), fs.open("nope", OpenFlag::TRUNC.into()));
    assert!(fs.list().is_empty());

    let fd = fs.open("nope", OpenFlag::CREATE.into()).unwrap();
    assert_eq!(0, fs.size(fd).unwrap());
    assert_eq!(vec!["nope".to_string()], fs.list());
}

#[test]
fn create_truncates_existing() {
    let (_disk, mut fs) = fresh();
    let fd = fs.create("a").unwrap();
    fs.write(fd, &pattern(3000)).unwrap();
    fs.close(fd).unwrap();

    // 不带 TRUNC 打开保留内容
    let fd = fs.open("a", OpenFlag::CREATE.into()).unwrap();
    assert_eq!(3072, fs.size(fd).unwrap());
    fs.close(fd).unwrap();

    let fd = fs.create("a").unwrap();
    assert_eq!(0, fs.size(fd).unwrap());
    assert_eq!(0, fs.stat(fd).unwrap().blocks);
    assert_eq!(1, fs.list().len());
}

#[test]
fn truncated_blocks_are_reused() {
    // 数据区 12 块，根目录占去 1 块
    let (_disk, mut fs) = fresh_with(Geometry::new(16, 8), Config::default());
    for round in 0..3 {
        let fd = fs.create("a").unwrap();
        fs.write(fd, &pattern(11 * 512)).unwrap();
        assert_eq!(11, fs.stat(fd).unwrap().blocks, "round {round}");
        fs.close(fd).unwrap();
    }
}

#[test]
fn stat_reports_file() {
    let (_disk, mut fs) = fresh();
    let fd = fs.create("a").unwrap();
    fs.write(fd, b"HELLOWORLD").unwrap();

    let stat = fs.stat(fd).unwrap();
    assert_eq!(InodeKind::File, stat.kind);
    assert_eq!(512, stat.size);
    assert_eq!(1, stat.blocks);
    assert_ne!(0, stat.inode);
}

#[test]
fn list_in_creation_order() {
    let (_disk, mut fs) = fresh();
    let names = ["one", "two", "three"];
    for name in names {
        let fd = fs.create(name).unwrap();
        fs.close(fd).unwrap();
    }
    assert_eq!(names.to_vec(), fs.list());
}

#[test]
fn directory_grows_past_one_block() {
    let (_disk, mut fs) = fresh_with(Geometry::new(256, 40), Config::default());
    for i in 0..39 {
        let fd = fs.create(&format!("f{i}")).unwrap();
        fs.write(fd, &[i as u8 + 1]).unwrap();
        fs.close(fd).unwrap();
    }
    assert_eq!(39, fs.list().len());

    let fd = fs.open("f38", OpenFlag::existing()).unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(1, fs.read(fd, &mut buf).unwrap());
    assert_eq!(39, buf[0]);
}

#[test]
fn inode_exhaustion() {
    // 根目录加两个文件
    let (_disk, mut fs) = fresh_with(Geometry::new(64, 3), Config::default());
    fs.create("a").unwrap();
    fs.create("b").unwrap();
    assert_eq!(Err(Error::NotFound), fs.create("c"));
    assert_eq!(2, fs.list().len());
}

#[test]
fn bad_names() {
    let (_disk, mut fs) = fresh();
    let long = "x".repeat(NAME_MAX_LEN + 1);
    assert_eq!(Err(Error::InvalidArgument), fs.create(""));
    assert_eq!(Err(Error::InvalidArgument), fs.create(&long));

    let fit = "x".repeat(NAME_MAX_LEN);
    let fd = fs.create(&fit).unwrap();
    fs.close(fd).unwrap();
    assert_eq!(vec![fit], fs.list());
}

#[test]
fn mount_unformatted_device() {
    let disk = Arc::new(RamDisk::new(64));
    assert_eq!(
        Err(Error::NotFormatted),
        FileSystem::mount(disk, Config::default()).map(|_| ())
    );
}

#[test]
fn format_rejects_bad_geometry() {
    let disk = Arc::new(RamDisk::new(64));
    let format = |geometry| {
        FileSystem::format(disk.clone(), geometry, Config::default()).map(|_| ())
    };
    assert_eq!(Err(Error::InvalidArgument), format(Geometry::new(64, 0)));
    assert_eq!(Err(Error::InvalidArgument), format(Geometry::new(3, 16)));
    assert_eq!(Ok(()), format(Geometry::new(64, 16)));
}

#[test]
fn remount_keeps_namespace() {
    let (disk, mut fs) = fresh();
    for name in ["x", "y"] {
        let fd = fs.create(name).unwrap();
        fs.write(fd, name.as_bytes()).unwrap();
        fs.close(fd).unwrap();
    }
    drop(fs);

    let mut fs = FileSystem::mount(disk, Config::default()).unwrap();
    assert_eq!(vec!["x".to_string(), "y".to_string()], fs.list());

    let fd = fs.open("y", OpenFlag::existing()).unwrap();
    fs.seek(fd, 0, Whence::End).unwrap();
    let mut buf = [0u8; 1];
    assert_eq!(0, fs.read(fd, &mut buf).unwrap());
}

#[test]
fn directory_exhaustion() {
    let (_disk, mut fs) = fresh_with(Geometry::new(8192, 2300), Config::default());
    // 根目录最多 MAX_FILE_BLOCKS 块，每块 16 个目录项
    let capacity = MAX_FILE_BLOCKS * 16;
    for i in 0..capacity {
        let fd = fs.create(&format!("f{i}")).unwrap();
        fs.close(fd).unwrap();
    }

    assert_eq!(Err(Error::NotFound), fs.create("one-more"));
    assert_eq!(Err(Error::NotFound), fs.open("one-more", OpenFlag::existing()));
    assert_eq!(capacity, fs.list().len());

    // 已有的名字仍可覆盖创建
    let fd = fs.create("f0").unwrap();
    fs.write(fd, b"still here").unwrap();
}

#[test]
fn directory_growth_without_space() {
    // 数据区 8 块：目录 1 块，大文件 7 块
    let (_disk, mut fs) = fresh_with(Geometry::new(16, 40), Config::default());
    let big = fs.create("big").unwrap();
    fs.write(big, &pattern(7 * 512)).unwrap();
    fs.close(big).unwrap();
    for i in 1..16 {
        let fd = fs.create(&format!("f{i}")).unwrap();
        fs.close(fd).unwrap();
    }

    assert_eq!(Err(Error::OutOfSpace), fs.create("f16"));
    assert_eq!(16, fs.list().len());

    // 释放数据块后目录可以继续增长
    let big = fs.create("big").unwrap();
    fs.close(big).unwrap();
    let fd = fs.create("f16").unwrap();
    fs.close(fd).unwrap();
    assert_eq!(17, fs.list().len());
}

#[test]
fn format_larger_than_device() {
    let disk = Arc::new(RamDisk::new(64));
    assert_eq!(
        Err(Error::InvalidArgument),
        FileSystem::format(disk.clone(), Geometry::new(128, 16), Config::default()).map(|_| ())
    );

    // 失败的格式化不会碰设备
    assert_eq!(
        Err(Error::NotFormatted),
        FileSystem::mount(disk.clone(), Config::default()).map(|_| ())
    );
    assert!(FileSystem::format(disk, Geometry::new(64, 16), Config::default()).is_ok());
}
