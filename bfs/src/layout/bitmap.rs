use crate::BLOCK_BITS;
use crate::block_cache::CacheManager;

/// 位图块按 64 位一组访问
type Words = [u64; BLOCK_BITS / 64];

/// 连续若干块组成的位图，第 n 位为 1 表示第 n 个对象已被占用
#[derive(Debug)]
pub struct Bitmap {
    first_block: usize,
    block_count: usize,
    /// 受管对象的个数，位图末尾多出的位永不分配
    limit: usize,
}

impl Bitmap {
    #[inline]
    pub fn new(first_block: usize, block_count: usize, limit: usize) -> Self {
        debug_assert!(limit <= block_count * BLOCK_BITS);
        Self {
            first_block,
            block_count,
            limit,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.limit
    }

    /// 占用最小的空闲编号，全部占满时返回空
    pub fn alloc(&self, cache: &CacheManager) -> Option<u32> {
        for nth in 0..self.block_count {
            let block = cache.get(self.first_block + nth);
            let mut block = block.lock();

            let free = block.map(0, |words: &Words| {
                words
                    .iter()
                    .position(|&word| word != u64::MAX)
                    .map(|i| i * 64 + words[i].trailing_ones() as usize)
            });
            let Some(bit) = free else {
                continue;
            };

            let id = nth * BLOCK_BITS + bit;
            // 首个空位已在界外，其后不会再有
            if id >= self.limit {
                return None;
            }
            block.map_mut(0, |words: &mut Words| words[bit / 64] |= 1 << (bit % 64));
            return Some(id as u32);
        }

        None
    }

    pub fn dealloc(&self, cache: &CacheManager, id: u32) {
        let id = id as usize;
        debug_assert!(id < self.limit);

        let bit = id % BLOCK_BITS;
        let mask = 1u64 << (bit % 64);
        cache
            .get(self.first_block + id / BLOCK_BITS)
            .lock()
            .map_mut(0, |words: &mut Words| {
                assert_ne!(words[bit / 64] & mask, 0, "bit {id} is already free");
                words[bit / 64] &= !mask;
            });
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use block_dev::BlockDevice;
    use spin::Mutex;

    use super::*;
    use crate::BLOCK_SIZE;

    struct Mem(Mutex<Vec<[u8; BLOCK_SIZE]>>);

    impl BlockDevice for Mem {
        fn read_block(&self, block_id: usize, buf: &mut [u8]) {
            buf.copy_from_slice(&self.0.lock()[block_id]);
        }

        fn write_block(&self, block_id: usize, buf: &[u8]) {
            self.0.lock()[block_id].copy_from_slice(buf);
        }
    }

    fn cache(blocks: usize) -> CacheManager {
        CacheManager::new(Arc::new(Mem(Mutex::new(vec![[0; BLOCK_SIZE]; blocks]))))
    }

    #[test]
    fn alloc_up_to_limit() {
        let cache = cache(2);
        let bitmap = Bitmap::new(1, 1, 70);

        for id in 0..70 {
            assert_eq!(Some(id), bitmap.alloc(&cache));
        }
        assert_eq!(None, bitmap.alloc(&cache));

        bitmap.dealloc(&cache, 65);
        bitmap.dealloc(&cache, 3);
        assert_eq!(Some(3), bitmap.alloc(&cache));
        assert_eq!(Some(65), bitmap.alloc(&cache));
        assert_eq!(None, bitmap.alloc(&cache));
    }

    #[test]
    fn spans_blocks() {
        let cache = cache(3);
        let limit = BLOCK_BITS + 2;
        let bitmap = Bitmap::new(1, 2, limit);

        for id in 0..limit as u32 {
            assert_eq!(Some(id), bitmap.alloc(&cache));
        }
        assert_eq!(None, bitmap.alloc(&cache));
        assert_eq!(limit, bitmap.capacity());
    }

    #[test]
    #[should_panic]
    fn double_free() {
        let cache = cache(2);
        let bitmap = Bitmap::new(1, 1, 8);
        let id = bitmap.alloc(&cache).unwrap();
        bitmap.dealloc(&cache, id);
        bitmap.dealloc(&cache, id);
    }
}
