use crate::Error;

pub const SEEK_SET: u32 = 0;
pub const SEEK_CUR: u32 = 1;
pub const SEEK_END: u32 = 2;

/// 游标移动的基准
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// 文件开头
    Set,
    /// 当前游标
    Cur,
    /// 文件大小（高水位）
    End,
}

impl TryFrom<u32> for Whence {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            SEEK_SET => Ok(Self::Set),
            SEEK_CUR => Ok(Self::Cur),
            SEEK_END => Ok(Self::End),
            _ => Err(Error::InvalidWhence),
        }
    }
}
