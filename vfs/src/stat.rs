/// 文件的元信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    /// Inode number
    pub inode: u64,
    pub kind: InodeKind,
    /// 高水位大小，按块对齐
    pub size: u64,
    /// Occupying data blocks
    pub blocks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum InodeKind {
    #[default]
    File,
    Directory,
}
