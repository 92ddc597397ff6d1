//! 超级块位于 0 号块，记录各区域的长度；区域的起点由长度依次推出。

use crate::{BLOCK_BITS, Geometry, MAGIC};

use super::INODES_PER_BLOCK;

#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(C)]
pub struct SuperBlock {
    magic: u32,
    pub total_blocks: u32,
    pub inodes: u32,
    pub inode_bitmap_blocks: u32,
    pub inode_area_blocks: u32,
    pub data_bitmap_blocks: u32,
    pub data_area_blocks: u32,
}

impl SuperBlock {
    /// 按几何参数划分区域，放不下任何数据块时返回空
    pub fn plan(geometry: Geometry) -> Option<Self> {
        let Geometry {
            total_blocks,
            inodes,
        } = geometry;
        if inodes == 0 {
            return None;
        }

        let bits = BLOCK_BITS as u32;
        let inode_bitmap_blocks = inodes.div_ceil(bits);
        let inode_area_blocks = inodes.div_ceil(INODES_PER_BLOCK as u32);

        let rest = total_blocks.checked_sub(1 + inode_bitmap_blocks + inode_area_blocks)?;
        // 每个位图块连同它指示的数据块共 bits + 1 块
        let data_bitmap_blocks = rest.div_ceil(bits + 1);
        let data_area_blocks = rest - data_bitmap_blocks;

        (data_area_blocks > 0).then_some(Self {
            magic: MAGIC,
            total_blocks,
            inodes,
            inode_bitmap_blocks,
            inode_area_blocks,
            data_bitmap_blocks,
            data_area_blocks,
        })
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
    }

    #[inline]
    pub fn inode_bitmap_start(&self) -> u32 {
        1
    }

    #[inline]
    pub fn inode_area_start(&self) -> u32 {
        self.inode_bitmap_start() + self.inode_bitmap_blocks
    }

    #[inline]
    pub fn data_bitmap_start(&self) -> u32 {
        self.inode_area_start() + self.inode_area_blocks
    }

    #[inline]
    pub fn data_area_start(&self) -> u32 {
        self.data_bitmap_start() + self.data_bitmap_blocks
    }
}
