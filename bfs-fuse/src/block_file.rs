use std::cell::{RefCell, RefMut};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use bfs::BLOCK_SIZE;
use block_dev::BlockDevice;
use send_wrapper::SendWrapper;

/// 以宿主机文件作为磁盘镜像的块设备
///
/// 只能在创建它的线程上使用。
#[derive(Debug)]
pub struct BlockFile {
    image: SendWrapper<RefCell<File>>,
}

impl BlockFile {
    pub fn new(image: File) -> Self {
        Self {
            image: SendWrapper::new(RefCell::new(image)),
        }
    }

    /// 打开已有的镜像
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let image = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self::new(image))
    }

    /// 创建恰好容纳`blocks`块的镜像，已有内容被丢弃
    pub fn create(path: impl AsRef<Path>, blocks: u64) -> io::Result<Self> {
        let image = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        image.set_len(blocks * BLOCK_SIZE as u64)?;
        Ok(Self::new(image))
    }

    fn at(&self, block_id: usize) -> RefMut<'_, File> {
        let mut image = self.image.borrow_mut();
        image
            .seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .unwrap_or_else(|e| panic!("seek to block {block_id}: {e}"));
        image
    }
}

impl BlockDevice for BlockFile {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) {
        self.at(block_id)
            .read_exact(buf)
            .unwrap_or_else(|e| panic!("read block {block_id}: {e}"));
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) {
        self.at(block_id)
            .write_all(buf)
            .unwrap_or_else(|e| panic!("write block {block_id}: {e}"));
    }

    fn block_count(&self) -> Option<usize> {
        let len = self.image.borrow().metadata().ok()?.len();
        Some((len / BLOCK_SIZE as u64) as usize)
    }
}
