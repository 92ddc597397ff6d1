//! # 会话层
//!
//! [`FileSystem`] 把一次挂载的 [`Bfs`] 与它的 [`OpenFileTable`] 绑在一起，
//! 所有操作都经由它进行。字节流读写见 `io` 模块。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use block_dev::BlockDevice;
use enumflags2::BitFlags;
use vfs::{Error, OpenFlag, Stat};

use crate::{Bfs, Fd, Geometry, OpenFileTable};

/// 读到最后一块时，如何判断数据的真实末尾
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EofPolicy {
    /// 最后一块末尾连续的零字节视为未写入，不计入读取长度。
    /// 真实数据以零结尾时会少报长度。
    #[default]
    TrailingZeros,
    /// 只以高水位为界，不做裁剪
    HighWaterMark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub eof: EofPolicy,
}

#[derive(Debug)]
pub struct FileSystem {
    pub(crate) bfs: Bfs,
    pub(crate) oft: OpenFileTable,
    pub(crate) config: Config,
}

impl FileSystem {
    pub fn format(
        block_device: Arc<dyn BlockDevice>,
        geometry: Geometry,
        config: Config,
    ) -> Result<Self, Error> {
        Ok(Self::new(Bfs::format(block_device, geometry)?, config))
    }

    pub fn mount(block_device: Arc<dyn BlockDevice>, config: Config) -> Result<Self, Error> {
        Ok(Self::new(Bfs::mount(block_device)?, config))
    }

    #[inline]
    pub fn new(bfs: Bfs, config: Config) -> Self {
        Self {
            bfs,
            oft: OpenFileTable::new(),
            config,
        }
    }

    /// 打开文件
    ///
    /// - `CREATE`：文件不存在时创建；
    /// - `TRUNC`：文件已存在时先清空。
    pub fn open(&mut self, name: &str, flags: BitFlags<OpenFlag>) -> Result<Fd, Error> {
        let inum = match self.bfs.lookup(name) {
            Ok(inum) => {
                if flags.contains(OpenFlag::TRUNC) {
                    self.bfs.truncate(inum)?;
                }
                inum
            }
            Err(Error::NotFound) if flags.contains(OpenFlag::CREATE) => {
                self.bfs.create_entry(name)?
            }
            Err(e) => return Err(e),
        };

        let fd = self.oft.bind(inum);
        log::debug!("open: {name:?} inode={inum} fd={fd}");
        Ok(fd)
    }

    /// 创建文件，已存在则清空
    #[inline]
    pub fn create(&mut self, name: &str) -> Result<Fd, Error> {
        self.open(name, OpenFlag::CREATE | OpenFlag::TRUNC)
    }

    pub fn close(&mut self, fd: Fd) -> Result<(), Error> {
        self.oft.unbind(fd)
    }

    pub fn stat(&self, fd: Fd) -> Result<Stat, Error> {
        self.bfs.stat(self.oft.inode_of(fd)?)
    }

    #[inline]
    pub fn list(&self) -> Vec<String> {
        self.bfs.list()
    }

    #[inline]
    pub fn sync(&self) {
        self.bfs.sync();
    }

    #[inline]
    pub fn bfs(&self) -> &Bfs {
        &self.bfs
    }

    #[inline]
    pub fn oft(&self) -> &OpenFileTable {
        &self.oft
    }
}
