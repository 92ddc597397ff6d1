//! 宿主机上使用 bfs 的工具：块设备驱动与镜像打包。

#[cfg(test)]
mod tests;

mod block_file;
mod ram_disk;

pub use self::{block_file::BlockFile, ram_disk::RamDisk};
