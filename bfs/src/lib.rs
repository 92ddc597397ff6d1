#![no_std]

extern crate alloc;

/* bfs 的整体架构，自上而下 */

// 会话层：打开文件表 + 字节流读写，对外暴露的全部操作
mod fs;
mod io;

// 打开文件表：文件描述符 -> (inode, 游标)
mod oft;

// 字节偏移 -> (逻辑块号, 块内偏移)
pub mod offset;

// 磁盘块管理器层：格式化、挂载、块分配、目录
mod bfs;

// 磁盘数据结构层
mod layout;

// 块缓存层：内存上的磁盘块数据缓存
mod block_cache;

mod id;

pub use self::{
    bfs::{Bfs, Geometry},
    fs::{Config, EofPolicy, FileSystem},
    id::{Dbn, Fbn, Fd, Inum},
    layout::{MAX_FILE_BLOCKS, NAME_MAX_LEN},
    oft::OpenFileTable,
};

pub const MAGIC: u32 = 0x0bf5_0001;
pub const BLOCK_SIZE: usize = 512;
pub const BLOCK_BITS: usize = BLOCK_SIZE * 8;

pub type DataBlock = [u8; BLOCK_SIZE];
