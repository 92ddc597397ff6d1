//! # 磁盘数据结构层
//!
//! bfs 的磁盘布局：
//! 超级块 | 索引节点位图 | 索引节点区域 | 数据块位图 | 数据块区域

mod super_block;
pub use super_block::SuperBlock;

mod bitmap;
pub use bitmap::Bitmap;

mod inode;
pub use inode::{DiskInode, INODE_SIZE, INODES_PER_BLOCK, MAX_FILE_BLOCKS};

/// 目录项，也属于磁盘文件系统数据结构
mod dir_entry;
pub use dir_entry::{DirBlock, DirEntry, NAME_MAX_LEN};
