//! # 磁盘块管理器层
//!
//! 构建出磁盘的布局并使用：格式化、挂载、inode 与数据块的分配、
//! 逻辑块到物理块的映射，以及扁平的根目录。
//!
//! 上层的字节流读写只通过这里的接口访问块设备。

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use block_dev::BlockDevice;
use vfs::{Error, InodeKind, Stat};

use crate::block_cache::CacheManager;
use crate::layout::*;
use crate::{DataBlock, Dbn, Fbn, Inum};

/// 格式化参数
///
/// 块设备报告了总块数时，`total_blocks`不得超过它；
/// 否则由调用者保证设备足够大。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// 块设备的总块数
    pub total_blocks: u32,
    /// inode 个数，含根目录
    pub inodes: u32,
}

impl Geometry {
    pub const fn new(total_blocks: u32, inodes: u32) -> Self {
        Self {
            total_blocks,
            inodes,
        }
    }
}

#[derive(Debug)]
pub struct Bfs {
    cache: CacheManager,
    inode_bitmap: Bitmap,
    data_bitmap: Bitmap,
    inode_area_start_block: u32,
    data_area_start_block: u32,
}

impl Bfs {
    /// 在块设备上建立新的文件系统，原有数据全部清零
    pub fn format(block_device: Arc<dyn BlockDevice>, geometry: Geometry) -> Result<Self, Error> {
        let Some(super_block) = SuperBlock::plan(geometry) else {
            log::error!("format: no room for data in {geometry:?}");
            return Err(Error::InvalidArgument);
        };

        let total = super_block.total_blocks as usize;
        if let Some(count) = block_device.block_count().filter(|&count| count < total) {
            log::error!("format: {geometry:?} exceeds the device of {count} blocks");
            return Err(Error::InvalidArgument);
        }

        let cache = CacheManager::new(block_device);
        for block_id in 0..total {
            cache.get(block_id).lock().zeroize();
        }
        cache
            .get(0)
            .lock()
            .map_mut(0, |sb: &mut SuperBlock| *sb = super_block.clone());

        let mut bfs = Self::with_layout(cache, &super_block);
        let root = bfs.alloc_inode().ok_or(Error::NotFound)?;
        debug_assert_eq!(root, Inum::ROOT);
        bfs.on_inode_mut(root, |disk_inode| {
            disk_inode.init(root.into(), InodeKind::Directory)
        });
        bfs.cache.sync_all();

        log::debug!("format: {super_block:?}");
        Ok(bfs)
    }

    /// 挂载已格式化的块设备
    pub fn mount(block_device: Arc<dyn BlockDevice>) -> Result<Self, Error> {
        let cache = CacheManager::new(block_device);

        let super_block = cache
            .get(0)
            .lock()
            .map(0, |sb: &SuperBlock| sb.is_valid().then(|| sb.clone()));
        let Some(super_block) = super_block else {
            log::error!("mount: bad magic");
            return Err(Error::NotFormatted);
        };

        log::debug!("mount: {super_block:?}");
        Ok(Self::with_layout(cache, &super_block))
    }

    /// 把缓存中的脏块全部写回块设备
    pub fn sync(&self) {
        self.cache.sync_all();
    }
}

/* 字节流读写所依赖的接口 */
impl Bfs {
    /// 逻辑块所映射的物理块，未分配时为空
    pub fn block_for(&self, inum: Inum, fbn: Fbn) -> Result<Option<Dbn>, Error> {
        self.check_inum(inum)?;
        if fbn.index() >= MAX_FILE_BLOCKS {
            return Err(Error::FileTooLarge);
        }

        Ok(self
            .on_inode(inum, |disk_inode| disk_inode.block_id(fbn, &self.cache))
            .map(Dbn::new))
    }

    /// 为逻辑块分配全零的物理块并绑定；已绑定则直接返回
    pub fn alloc_block(&mut self, inum: Inum, fbn: Fbn) -> Result<Dbn, Error> {
        if let Some(dbn) = self.block_for(inum, fbn)? {
            return Ok(dbn);
        }

        if self.on_inode(inum, |disk_inode| disk_inode.needs_indirect(fbn)) {
            let indirect = self.alloc_data()?;
            self.on_inode_mut(inum, |disk_inode| disk_inode.set_indirect(indirect));
        }

        let dbn = self.alloc_data()?;
        self.on_inode_mut(inum, |disk_inode| {
            disk_inode.bind(fbn, dbn, &self.cache)
        });
        self.cache.sync_all();

        log::trace!("alloc_block: inode={inum} fbn={fbn} -> dbn={dbn}");
        Ok(Dbn::new(dbn))
    }

    pub fn read_block(&self, dbn: Dbn, buf: &mut DataBlock) {
        self.cache
            .get(dbn.block())
            .lock()
            .map(0, |data_block: &DataBlock| buf.copy_from_slice(data_block));
    }

    /// 写入并立即落盘
    pub fn write_block(&self, dbn: Dbn, buf: &DataBlock) {
        let block = self.cache.get(dbn.block());
        let mut block = block.lock();
        block.map_mut(0, |data_block: &mut DataBlock| data_block.copy_from_slice(buf));
        block.sync();
    }

    /// 高水位：已分配最高逻辑块的末尾，按块对齐
    pub fn high_water_mark(&self, inum: Inum) -> Result<usize, Error> {
        self.check_inum(inum)?;
        Ok(self.on_inode(inum, |disk_inode| disk_inode.size as usize))
    }
}

/* 根目录 */
impl Bfs {
    /// 根据文件名获取 inode
    pub fn lookup(&self, name: &str) -> Result<Inum, Error> {
        self.dir_blocks()
            .into_iter()
            .find_map(|dbn| {
                self.cache
                    .get(dbn.block())
                    .lock()
                    .map(0, |dirents: &DirBlock| {
                        dirents
                            .iter()
                            .find(|dirent| !dirent.is_free() && dirent.name() == name)
                            .map(|dirent| Inum::new(dirent.inode_id()))
                    })
            })
            .ok_or(Error::NotFound)
    }

    /// 创建文件；同名文件已存在则清空后复用其 inode
    pub fn create_entry(&mut self, name: &str) -> Result<Inum, Error> {
        if !DirEntry::is_valid_name(name) {
            return Err(Error::InvalidArgument);
        }

        if let Ok(inum) = self.lookup(name) {
            self.truncate(inum)?;
            return Ok(inum);
        }

        let Some(inum) = self.alloc_inode() else {
            log::warn!("create_entry: run out of inodes");
            return Err(Error::NotFound);
        };
        self.on_inode_mut(inum, |disk_inode| disk_inode.init(inum.into(), InodeKind::File));

        let (dbn, slot) = match self.find_or_new_slot() {
            Ok(pos) => pos,
            Err(e) => {
                self.inode_bitmap.dealloc(&self.cache, inum.into());
                return Err(e);
            }
        };
        self.cache
            .get(dbn.block())
            .lock()
            .map_mut(0, |dirents: &mut DirBlock| {
                dirents[slot] = DirEntry::new(name, inum.into())
            });
        self.cache.sync_all();

        log::debug!("create_entry: {name:?} -> inode={inum}");
        Ok(inum)
    }

    /// 根目录下所有文件名，按槽位顺序
    pub fn list(&self) -> Vec<String> {
        self.dir_blocks()
            .into_iter()
            .flat_map(|dbn| {
                self.cache
                    .get(dbn.block())
                    .lock()
                    .map(0, |dirents: &DirBlock| {
                        dirents
                            .iter()
                            .filter(|dirent| !dirent.is_free())
                            .map(|dirent| dirent.name().to_string())
                            .collect::<Vec<_>>()
                    })
            })
            .collect()
    }

    /// 回收文件的全部块，高水位归零
    pub fn truncate(&mut self, inum: Inum) -> Result<(), Error> {
        self.check_inum(inum)?;
        let blocks = self.on_inode_mut(inum, |disk_inode| disk_inode.clear(&self.cache));
        for block_id in blocks {
            self.dealloc_data(block_id);
        }
        self.cache.sync_all();
        Ok(())
    }

    pub fn stat(&self, inum: Inum) -> Result<Stat, Error> {
        self.check_inum(inum)?;
        Ok(self.on_inode(inum, |disk_inode| Stat {
            inode: disk_inode.id as u64,
            kind: disk_inode.kind,
            size: disk_inode.size as u64,
            blocks: disk_inode.data_blocks(&self.cache) as u64,
        }))
    }
}

impl Bfs {
    fn with_layout(cache: CacheManager, sb: &SuperBlock) -> Self {
        Self {
            cache,
            inode_bitmap: Bitmap::new(
                sb.inode_bitmap_start() as usize,
                sb.inode_bitmap_blocks as usize,
                sb.inodes as usize,
            ),
            data_bitmap: Bitmap::new(
                sb.data_bitmap_start() as usize,
                sb.data_bitmap_blocks as usize,
                sb.data_area_blocks as usize,
            ),
            inode_area_start_block: sb.inode_area_start(),
            data_area_start_block: sb.data_area_start(),
        }
    }

    /// 在磁盘上分配新的 inode
    #[inline]
    fn alloc_inode(&mut self) -> Option<Inum> {
        self.inode_bitmap.alloc(&self.cache).map(Inum::new)
    }

    /// 在磁盘上分配新的全零数据块并返回其ID
    fn alloc_data(&mut self) -> Result<u32, Error> {
        let Some(index) = self.data_bitmap.alloc(&self.cache) else {
            log::warn!("alloc_data: run out of data blocks");
            return Err(Error::OutOfSpace);
        };
        let block_id = self.data_area_start_block + index;
        self.cache.get(block_id as usize).lock().zeroize();
        Ok(block_id)
    }

    fn dealloc_data(&mut self, block_id: u32) {
        self.cache.get(block_id as usize).lock().zeroize();
        self.data_bitmap
            .dealloc(&self.cache, block_id - self.data_area_start_block)
    }

    fn check_inum(&self, inum: Inum) -> Result<(), Error> {
        if (u32::from(inum) as usize) < self.inode_bitmap.capacity() {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    /// 通过ID获取 inode 在磁盘上的位置：**块ID**以及**块内偏移**
    fn disk_inode_pos(&self, inum: Inum) -> (usize, usize) {
        let id = u32::from(inum) as usize;
        let block_id = self.inode_area_start_block as usize + id / INODES_PER_BLOCK;
        let block_offset = id % INODES_PER_BLOCK * INODE_SIZE;

        (block_id, block_offset)
    }

    /// 读取对磁盘的映射并处理
    fn on_inode<V>(&self, inum: Inum, f: impl FnOnce(&DiskInode) -> V) -> V {
        let (block_id, block_offset) = self.disk_inode_pos(inum);
        self.cache.get(block_id).lock().map(block_offset, f)
    }

    /// 以某种方式修改对磁盘的映射
    fn on_inode_mut<V>(&self, inum: Inum, f: impl FnOnce(&mut DiskInode) -> V) -> V {
        let (block_id, block_offset) = self.disk_inode_pos(inum);
        self.cache.get(block_id).lock().map_mut(block_offset, f)
    }

    /// 根目录已分配的数据块，目录从不留空洞
    fn dir_blocks(&self) -> Vec<Dbn> {
        (0..MAX_FILE_BLOCKS)
            .map(Fbn::new)
            .map_while(|fbn| {
                self.on_inode(Inum::ROOT, |root| root.block_id(fbn, &self.cache))
                    .map(Dbn::new)
            })
            .collect()
    }

    /// 在根目录中寻找空槽位；找不到就为目录分配新块。
    /// 目录项用尽为`NotFound`，数据块耗尽仍为`OutOfSpace`
    fn find_or_new_slot(&mut self) -> Result<(Dbn, usize), Error> {
        let blocks = self.dir_blocks();
        for &dbn in &blocks {
            let slot = self
                .cache
                .get(dbn.block())
                .lock()
                .map(0, |dirents: &DirBlock| dirents.iter().position(DirEntry::is_free));
            if let Some(slot) = slot {
                return Ok((dbn, slot));
            }
        }

        // 根目录的块索引已满，不能再长
        if blocks.len() == MAX_FILE_BLOCKS {
            log::warn!("create_entry: root directory is full");
            return Err(Error::NotFound);
        }

        let dbn = self.alloc_block(Inum::ROOT, Fbn::new(blocks.len()))?;
        Ok((dbn, 0))
    }
}
