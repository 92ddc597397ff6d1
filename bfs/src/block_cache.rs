//! # 块缓存层
//!
//! 在内存中保留最近用到的若干块，磁盘结构直接映射在缓存的块数据上，
//! 上层对块设备的访问全部经过这里。
//!
//! 脏块在 `sync`、被换出或缓存释放时写回块设备。
//! 每个 [`Bfs`](crate::Bfs) 持有自己的 [`CacheManager`]，不同的挂载互不干扰。

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use core::mem;

use block_dev::BlockDevice;
use spin::Mutex;

use crate::BLOCK_SIZE;

/// 按8字节对齐的块数据
#[repr(C, align(8))]
struct AlignedBlock([u8; BLOCK_SIZE]);

/// 内存中的块缓存
pub struct BlockCache {
    data: Box<AlignedBlock>,
    block_id: usize,
    block_device: Arc<dyn BlockDevice>,
    dirty: bool,
}

impl BlockCache {
    fn load(block_id: usize, block_device: Arc<dyn BlockDevice>) -> Self {
        let mut data = Box::new(AlignedBlock([0; BLOCK_SIZE]));
        block_device.read_block(block_id, &mut data.0);

        Self {
            data,
            block_id,
            block_device,
            dirty: false,
        }
    }

    /// 脏块写回块设备
    pub fn sync(&mut self) {
        if mem::take(&mut self.dirty) {
            self.block_device.write_block(self.block_id, &self.data.0);
        }
    }

    /// 把块内`offset`处的字节视作`T`
    pub fn get<T>(&self, offset: usize) -> &T {
        check_fit::<T>(offset);
        unsafe { &*self.data.0.as_ptr().add(offset).cast() }
    }

    pub fn get_mut<T>(&mut self, offset: usize) -> &mut T {
        check_fit::<T>(offset);
        self.dirty = true;
        unsafe { &mut *self.data.0.as_mut_ptr().add(offset).cast() }
    }

    #[inline]
    pub fn map<T, V>(&self, offset: usize, f: impl FnOnce(&T) -> V) -> V {
        f(self.get(offset))
    }

    #[inline]
    pub fn map_mut<T, V>(&mut self, offset: usize, f: impl FnOnce(&mut T) -> V) -> V {
        f(self.get_mut(offset))
    }

    #[inline]
    pub fn zeroize(&mut self) {
        self.data.0.fill(0);
        self.dirty = true;
    }
}

impl Drop for BlockCache {
    fn drop(&mut self) {
        self.sync();
    }
}

fn check_fit<T>(offset: usize) {
    assert!(
        offset + mem::size_of::<T>() <= BLOCK_SIZE,
        "{offset} + {} overflows the block",
        mem::size_of::<T>()
    );
    debug_assert_eq!(offset % mem::align_of::<T>(), 0);
}

/// 块缓存的调度：最近使用的在队尾，换出时从队首找闲置块
pub struct CacheManager {
    block_device: Arc<dyn BlockDevice>,
    lru: Mutex<VecDeque<(usize, Arc<Mutex<BlockCache>>)>>,
}

impl CacheManager {
    /// 块缓存个数的上限
    pub const CAPACITY: usize = 16;

    pub fn new(block_device: Arc<dyn BlockDevice>) -> Self {
        Self {
            block_device,
            lru: Mutex::default(),
        }
    }

    pub fn get(&self, block_id: usize) -> Arc<Mutex<BlockCache>> {
        let mut lru = self.lru.lock();

        let pos = lru.iter().position(|(id, _)| *id == block_id);
        if let Some(hit) = pos.and_then(|pos| lru.remove(pos)) {
            let cache = Arc::clone(&hit.1);
            lru.push_back(hit);
            return cache;
        }

        if lru.len() == Self::CAPACITY {
            // 仍被持有的块不能换出
            let victim = lru
                .iter()
                .position(|(_, cache)| Arc::strong_count(cache) == 1)
                .expect("run out of block cache");
            lru.remove(victim);
        }

        let cache = Arc::new(Mutex::new(BlockCache::load(
            block_id,
            Arc::clone(&self.block_device),
        )));
        lru.push_back((block_id, Arc::clone(&cache)));

        cache
    }

    pub fn sync_all(&self) {
        for (_, cache) in self.lru.lock().iter() {
            cache.lock().sync();
        }
    }
}

impl core::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CacheManager")
            .field("cached", &self.lru.lock().len())
            .finish()
    }
}
