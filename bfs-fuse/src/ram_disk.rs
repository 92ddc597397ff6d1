use std::sync::Mutex;

use bfs::BLOCK_SIZE;
use block_dev::BlockDevice;

/// 内存中的块设备
#[derive(Debug)]
pub struct RamDisk {
    data: Mutex<Vec<u8>>,
}

impl RamDisk {
    pub fn new(blocks: usize) -> Self {
        Self {
            data: Mutex::new(vec![0; blocks * BLOCK_SIZE]),
        }
    }

    /// 直接窥探某块的原始内容
    pub fn block(&self, block_id: usize) -> Vec<u8> {
        let data = self.data.lock().unwrap();
        data[block_id * BLOCK_SIZE..(block_id + 1) * BLOCK_SIZE].to_vec()
    }
}

impl BlockDevice for RamDisk {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) {
        let data = self.data.lock().unwrap();
        let start = block_id * BLOCK_SIZE;
        buf.copy_from_slice(&data[start..start + BLOCK_SIZE]);
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) {
        let mut data = self.data.lock().unwrap();
        let start = block_id * BLOCK_SIZE;
        data[start..start + BLOCK_SIZE].copy_from_slice(buf);
    }

    fn block_count(&self) -> Option<usize> {
        Some(self.data.lock().unwrap().len() / BLOCK_SIZE)
    }
}
