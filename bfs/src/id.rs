//! 各类编号的强类型包装

use core::ops::AddAssign;

use derive_more::{Display, From, Into};

/// 文件内的逻辑块号(file block number)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct Fbn(usize);

/// 块设备上的物理块号(disk block number)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct Dbn(u32);

/// inode 编号
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct Inum(u32);

/// 文件描述符，即打开文件表的槽位
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct Fd(usize);

impl AddAssign<usize> for Fbn {
    fn add_assign(&mut self, rhs: usize) {
        self.0 += rhs;
    }
}

impl Fbn {
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl Dbn {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// 块缓存层使用的块ID
    #[inline]
    pub const fn block(self) -> usize {
        self.0 as usize
    }
}

impl Inum {
    /// 根目录
    pub const ROOT: Self = Self(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl Fd {
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn slot(self) -> usize {
        self.0
    }
}
