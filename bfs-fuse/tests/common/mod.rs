#![allow(dead_code)]

use std::sync::Arc;

use bfs::{Config, FileSystem, Geometry};
use bfs_fuse::RamDisk;

pub const TOTAL_BLOCKS: u32 = 256;
pub const INODES: u32 = 16;

pub fn fresh() -> (Arc<RamDisk>, FileSystem) {
    fresh_with(Geometry::new(TOTAL_BLOCKS, INODES), Config::default())
}

pub fn fresh_with(geometry: Geometry, config: Config) -> (Arc<RamDisk>, FileSystem) {
    let disk = Arc::new(RamDisk::new(geometry.total_blocks as usize));
    let fs = FileSystem::format(disk.clone(), geometry, config).unwrap();
    (disk, fs)
}

/// 不含零字节的测试数据
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251 + 1) as u8).collect()
}
