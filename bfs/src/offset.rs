//! 字节偏移与块坐标的换算

use crate::{BLOCK_SIZE, Fbn};

/// 字节偏移 -> (逻辑块号, 块内偏移)
#[inline]
pub const fn translate(offset: usize) -> (Fbn, usize) {
    (Fbn::new(offset / BLOCK_SIZE), offset % BLOCK_SIZE)
}
