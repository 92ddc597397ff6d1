//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘、U盘、磁盘镜像文件；
//! [`BlockDevice`] 就是对读写块设备的抽象，实现了此特质的类型称为**块设备驱动**。
//!
//! 块设备读写失败属于不可恢复的错误，驱动直接 panic，不向上层返回。

#![no_std]

use core::any::Any;

/// 块设备驱动特质
///
/// `buf` 的长度恰为一个块。
pub trait BlockDevice: Send + Sync + Any {
    fn read_block(&self, block_id: usize, buf: &mut [u8]);
    fn write_block(&self, block_id: usize, buf: &[u8]);

    /// 设备的总块数，无从得知时为空
    fn block_count(&self) -> Option<usize> {
        None
    }
}
