use core::mem;

use crate::BLOCK_SIZE;

/// 文件名的最大长度
pub const NAME_MAX_LEN: usize = 27;

/// 一个块能容纳的目录项个数
pub const DIRENTS_PER_BLOCK: usize = BLOCK_SIZE / mem::size_of::<DirEntry>();

/// 目录的数据块
pub type DirBlock = [DirEntry; DIRENTS_PER_BLOCK];

/// 文件系统项的元信息
///
/// 全零即空槽位。
#[derive(Debug, Default, Clone)]
#[repr(C)]
pub struct DirEntry {
    // 最后一字节留给 \0
    name: [u8; NAME_MAX_LEN + 1],
    inode_id: u32,
}

impl DirEntry {
    #[inline]
    pub fn new(name: &str, inode_id: u32) -> Self {
        let bytes = name.as_bytes();
        let mut name = [0; NAME_MAX_LEN + 1];
        name[..bytes.len()].copy_from_slice(bytes);

        Self { name, inode_id }
    }

    /// 名字能否放进目录项
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && name.len() <= NAME_MAX_LEN && !name.as_bytes().contains(&0)
    }

    pub fn name(&self) -> &str {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(NAME_MAX_LEN);
        core::str::from_utf8(&self.name[..len]).unwrap_or_default()
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.name[0] == 0
    }

    #[inline]
    pub fn inode_id(&self) -> u32 {
        self.inode_id
    }
}
