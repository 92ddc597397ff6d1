use derive_more::Display;

/// 文件系统操作的错误
///
/// 全部可恢复，由调用者决定如何处理。
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 文件不存在，或目录已无可用的 inode
    #[display(fmt = "no such file")]
    NotFound,
    /// 负偏移、游标溢出、非法文件名
    #[display(fmt = "invalid argument")]
    InvalidArgument,
    /// 无法识别的 whence
    #[display(fmt = "invalid whence")]
    InvalidWhence,
    /// 数据块耗尽
    #[display(fmt = "no space left on device")]
    OutOfSpace,
    /// 文件描述符没有对应的打开文件表项
    #[display(fmt = "bad file descriptor")]
    BadHandle,
    /// 逻辑块号超出 inode 的索引范围
    #[display(fmt = "file too large")]
    FileTooLarge,
    /// 块设备上没有合法的超级块
    #[display(fmt = "device is not formatted")]
    NotFormatted,
}

impl Error {
    /// 对应的 POSIX errno
    pub fn errno(self) -> i32 {
        match self {
            Self::NotFound => 2,
            Self::InvalidArgument => 22,
            Self::InvalidWhence => 22,
            Self::OutOfSpace => 28,
            Self::BadHandle => 9,
            Self::FileTooLarge => 27,
            Self::NotFormatted => 19,
        }
    }
}
