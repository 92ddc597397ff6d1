//! # 字节流读写
//!
//! 把任意、不对齐的字节区间读写拆成一串定长块操作，并维护打开文件的游标。
//!
//! 文件大小不单独记录，取分配层报告的高水位，按块对齐。

use core::ops::Range;

use vfs::{Error, Whence};

use crate::layout::MAX_FILE_BLOCKS;
use crate::offset::translate;
use crate::{BLOCK_SIZE, DataBlock, EofPolicy, Fd, FileSystem};

impl FileSystem {
    /// 从游标处读出数据填充`buf`，返回交付的字节数。
    ///
    /// 读取止于高水位。默认策略下，最后一块末尾连续的零字节视为未写入，
    /// 落在本次读取范围内的部分不计入返回值；游标按返回值前移。
    pub fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize, Error> {
        let inode = self.oft.inode_of(fd)?;
        let cursor = self.oft.cursor_of(fd)?;
        let end = cursor
            .saturating_add(buf.len())
            .min(self.bfs.high_water_mark(inode)?);

        if cursor >= end {
            return Ok(0);
        }

        let total = end - cursor;
        let (mut fbn, mut intra) = translate(cursor);
        let mut block: DataBlock = [0; BLOCK_SIZE];
        // 最后一块上被复制的块内区间
        let mut span = 0..0;
        let mut staged = 0;
        while staged < total {
            match self.bfs.block_for(inode, fbn)? {
                Some(dbn) => self.bfs.read_block(dbn, &mut block),
                // 空洞
                None => block.fill(0),
            }

            let n = (total - staged).min(BLOCK_SIZE - intra);
            buf[staged..staged + n].copy_from_slice(&block[intra..intra + n]);
            log::trace!("read: fbn={fbn} [{intra}, {})", intra + n);

            span = intra..intra + n;
            staged += n;
            intra = 0;
            fbn += 1;
        }

        let delivered = match self.config.eof {
            EofPolicy::TrailingZeros => staged - unwritten_tail(&block, span),
            EofPolicy::HighWaterMark => staged,
        };
        self.oft.set_cursor(fd, cursor + delivered)?;

        Ok(delivered)
    }

    /// 从游标处写入`buf`的全部数据，成功后游标前移`buf.len()`。
    ///
    /// 未分配的块先分配（全零），已分配的块先读出再覆盖，保留写入区间外的字节；
    /// 每块写完立即落盘。中途失败时已落盘的块不会回滚，游标保持不动。
    pub fn write(&mut self, fd: Fd, buf: &[u8]) -> Result<(), Error> {
        let inode = self.oft.inode_of(fd)?;
        let cursor = self.oft.cursor_of(fd)?;

        if buf.is_empty() {
            return Ok(());
        }

        let end = cursor
            .checked_add(buf.len())
            .ok_or(Error::FileTooLarge)?;
        if translate(end - 1).0.index() >= MAX_FILE_BLOCKS {
            return Err(Error::FileTooLarge);
        }

        let (mut fbn, mut intra) = translate(cursor);
        let mut block: DataBlock = [0; BLOCK_SIZE];
        let mut written = 0;
        while written < buf.len() {
            let dbn = match self.bfs.block_for(inode, fbn)? {
                Some(dbn) => {
                    self.bfs.read_block(dbn, &mut block);
                    dbn
                }
                None => {
                    let dbn = self.bfs.alloc_block(inode, fbn)?;
                    block.fill(0);
                    dbn
                }
            };

            let n = (buf.len() - written).min(BLOCK_SIZE - intra);
            block[intra..intra + n].copy_from_slice(&buf[written..written + n]);
            self.bfs.write_block(dbn, &block);
            log::trace!("write: fbn={fbn} dbn={dbn} [{intra}, {})", intra + n);

            written += n;
            intra = 0;
            fbn += 1;
        }

        self.oft.set_cursor(fd, end)
    }

    /// 移动游标，返回新的游标。
    ///
    /// 任何基准下负偏移都是非法的。游标可以越过高水位，
    /// 越过的块不会因此被分配。
    pub fn seek(&mut self, fd: Fd, offset: i64, whence: Whence) -> Result<usize, Error> {
        if offset < 0 {
            return Err(Error::InvalidArgument);
        }
        let offset = usize::try_from(offset).map_err(|_| Error::InvalidArgument)?;

        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => self.oft.cursor_of(fd)?,
            Whence::End => self.size(fd)?,
        };
        let cursor = base.checked_add(offset).ok_or(Error::InvalidArgument)?;

        self.oft.set_cursor(fd, cursor)?;
        Ok(cursor)
    }

    /// 以原始的 `SEEK_*` 值移动游标
    pub fn seek_raw(&mut self, fd: Fd, offset: i64, whence: u32) -> Result<usize, Error> {
        if offset < 0 {
            return Err(Error::InvalidArgument);
        }
        self.seek(fd, offset, Whence::try_from(whence)?)
    }

    #[inline]
    pub fn tell(&self, fd: Fd) -> Result<usize, Error> {
        self.oft.cursor_of(fd)
    }

    /// 文件大小，即高水位
    #[inline]
    pub fn size(&self, fd: Fd) -> Result<usize, Error> {
        self.bfs.high_water_mark(self.oft.inode_of(fd)?)
    }
}

/// `span` 中落在块末尾连续零字节里的长度
fn unwritten_tail(block: &DataBlock, span: Range<usize>) -> usize {
    let zeros = block.iter().rev().take_while(|&&b| b == 0).count();
    let data_end = BLOCK_SIZE - zeros;
    span.end.saturating_sub(data_end.max(span.start))
}
