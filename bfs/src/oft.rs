//! # 打开文件表
//!
//! 每个被打开的 inode 在表中至多占一项，项内记录游标与引用计数。
//! 重复打开同一文件得到同一个文件描述符，游标共享；
//! 引用计数归零时表项才被释放，槽位留给后来者。

use alloc::vec::Vec;

use vfs::Error;

use crate::{Fd, Inum};

#[derive(Debug, Clone)]
struct OftEntry {
    inode: Inum,
    /// **文件**内的偏移量
    cursor: usize,
    refcount: usize,
}

#[derive(Debug, Default)]
pub struct OpenFileTable {
    entries: Vec<Option<OftEntry>>,
}

impl OpenFileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定 inode，返回其文件描述符。
    /// 首次绑定时游标置零，之后只增加引用计数。
    pub fn bind(&mut self, inode: Inum) -> Fd {
        if let Some((slot, entry)) = self
            .entries
            .iter_mut()
            .enumerate()
            .find_map(|(slot, entry)| {
                entry
                    .as_mut()
                    .filter(|entry| entry.inode == inode)
                    .map(|entry| (slot, entry))
            })
        {
            entry.refcount += 1;
            return Fd::new(slot);
        }

        // 插入新表项至空槽位
        let slot = match self.entries.iter().position(Option::is_none) {
            Some(slot) => slot,
            None => {
                self.entries.push(None);
                self.entries.len() - 1
            }
        };
        self.entries[slot] = Some(OftEntry {
            inode,
            cursor: 0,
            refcount: 1,
        });
        Fd::new(slot)
    }

    /// 解除一次绑定，引用计数归零时释放表项
    pub fn unbind(&mut self, fd: Fd) -> Result<(), Error> {
        let entry = self.entry_mut(fd)?;
        entry.refcount -= 1;
        if entry.refcount == 0 {
            self.entries[fd.slot()] = None;
        }
        Ok(())
    }

    pub fn inode_of(&self, fd: Fd) -> Result<Inum, Error> {
        self.entry(fd).map(|entry| entry.inode)
    }

    pub fn cursor_of(&self, fd: Fd) -> Result<usize, Error> {
        self.entry(fd).map(|entry| entry.cursor)
    }

    pub fn set_cursor(&mut self, fd: Fd, cursor: usize) -> Result<(), Error> {
        self.entry_mut(fd)?.cursor = cursor;
        Ok(())
    }

    pub fn refcount(&self, fd: Fd) -> Result<usize, Error> {
        self.entry(fd).map(|entry| entry.refcount)
    }

    /// 有效表项个数
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OpenFileTable {
    fn entry(&self, fd: Fd) -> Result<&OftEntry, Error> {
        self.entries
            .get(fd.slot())
            .and_then(Option::as_ref)
            .ok_or(Error::BadHandle)
    }

    fn entry_mut(&mut self, fd: Fd) -> Result<&mut OftEntry, Error> {
        self.entries
            .get_mut(fd.slot())
            .and_then(Option::as_mut)
            .ok_or(Error::BadHandle)
    }
}
