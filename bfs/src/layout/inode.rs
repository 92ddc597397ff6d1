//! 磁盘上的 inode
//!
//! 块索引分两级：
//! - 直接索引：inode 内连续存储 [`DIRECT_COUNT`] 个块编号；
//! - 一级间接索引：整个块连续存储**块编号**，每个编号都指向一个**数据块**。
//!
//! 块编号 0 是超级块，不可能是数据块，因此用 0 表示逻辑块尚未分配。
//! 文件中间允许存在未分配的空洞。

use alloc::vec::Vec;
use core::mem;

use vfs::InodeKind;

use crate::block_cache::CacheManager;
use crate::{BLOCK_SIZE, Fbn};

/// 间接索引块的编号容量
const INDIRECT_COUNT: usize = BLOCK_SIZE / 4;
/// 间接索引块
type IndirectBlock = [u32; INDIRECT_COUNT];

/// 直接索引块可编号数量
const DIRECT_COUNT: usize = 12;
/// 直接索引时的编号容量
const DIRECT_CAP: usize = DIRECT_COUNT;
/// 用上一级索引时的编号容量
const INDIRECT1_CAP: usize = DIRECT_CAP + INDIRECT_COUNT;

/// 单个文件最多拥有的逻辑块数
pub const MAX_FILE_BLOCKS: usize = INDIRECT1_CAP;

/// 未分配
const UNALLOCATED: u32 = 0;

pub const INODE_SIZE: usize = mem::size_of::<DiskInode>();
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE;

#[derive(Default)]
#[repr(C)]
pub struct DiskInode {
    /// ID
    pub id: u32,
    /// 高水位：已分配的最高逻辑块的末尾字节偏移。
    /// 不用usize是为了严控布局
    pub size: u32,
    /// 类型
    pub kind: InodeKind,
    /// 直接索引块，包含 DIRECT_COUNT 个块编号
    direct: [u32; DIRECT_COUNT],
    /// 指向一个一级索引块
    indirect1: u32,
}

impl DiskInode {
    #[inline]
    pub fn init(&mut self, id: u32, kind: InodeKind) {
        *self = Self {
            id,
            kind,
            ..Default::default()
        }
    }

    /// 逻辑块号对应的块编号，未分配时返回空
    pub fn block_id(&self, fbn: Fbn, cache: &CacheManager) -> Option<u32> {
        let index = fbn.index();

        let id = if index < DIRECT_CAP {
            self.direct[index]
        } else if index < INDIRECT1_CAP {
            if self.indirect1 == UNALLOCATED {
                return None;
            }
            cache
                .get(self.indirect1 as usize)
                .lock()
                .map(0, |indirect1: &IndirectBlock| {
                    // 剔去直接索引的部分
                    indirect1[index - DIRECT_CAP]
                })
        } else {
            return None;
        };

        (id != UNALLOCATED).then_some(id)
    }

    /// 绑定逻辑块之前，是否还需要一个一级索引块
    #[inline]
    pub fn needs_indirect(&self, fbn: Fbn) -> bool {
        fbn.index() >= DIRECT_CAP && self.indirect1 == UNALLOCATED
    }

    #[inline]
    pub fn set_indirect(&mut self, block_id: u32) {
        debug_assert_eq!(self.indirect1, UNALLOCATED);
        self.indirect1 = block_id;
    }

    /// 将逻辑块绑定到块编号上，并抬高高水位
    pub fn bind(&mut self, fbn: Fbn, block_id: u32, cache: &CacheManager) {
        let index = fbn.index();
        assert!(index < MAX_FILE_BLOCKS);

        if index < DIRECT_CAP {
            self.direct[index] = block_id;
        } else {
            assert_ne!(self.indirect1, UNALLOCATED);
            cache
                .get(self.indirect1 as usize)
                .lock()
                .map_mut(0, |indirect1: &mut IndirectBlock| {
                    indirect1[index - DIRECT_CAP] = block_id;
                });
        }

        let end = ((index + 1) * BLOCK_SIZE) as u32;
        self.size = self.size.max(end);
    }

    /// 清空索引，返回所有需要回收的块（数据块与索引块）
    pub fn clear(&mut self, cache: &CacheManager) -> Vec<u32> {
        let mut blocks: Vec<u32> = self
            .direct
            .iter()
            .copied()
            .filter(|&id| id != UNALLOCATED)
            .collect();
        self.direct.fill(UNALLOCATED);

        if self.indirect1 != UNALLOCATED {
            cache
                .get(self.indirect1 as usize)
                .lock()
                .map(0, |indirect1: &IndirectBlock| {
                    blocks.extend(indirect1.iter().copied().filter(|&id| id != UNALLOCATED));
                });
            blocks.push(self.indirect1);
            self.indirect1 = UNALLOCATED;
        }

        self.size = 0;
        blocks
    }

    /// 已分配的数据块个数，不含索引块
    pub fn data_blocks(&self, cache: &CacheManager) -> usize {
        let direct = self.direct.iter().filter(|&&id| id != UNALLOCATED).count();
        if self.indirect1 == UNALLOCATED {
            return direct;
        }

        direct
            + cache
                .get(self.indirect1 as usize)
                .lock()
                .map(0, |indirect1: &IndirectBlock| {
                    indirect1.iter().filter(|&&id| id != UNALLOCATED).count()
                })
    }
}
