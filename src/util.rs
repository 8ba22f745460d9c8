use std::io::Cursor;

use crate::{PlainBufferResult, error::PlainBufferError};

/// 基于切片的 cursor 的读取辅助方法。
///
/// 所有变长的读取都先检查剩余字节数，长度字段被破坏的时候直接返回 `TruncatedInput`，
/// 不会按照错误的长度去分配内存。
pub(crate) trait SliceCursorExt<'a> {
    /// 剩余可读的字节数
    fn remaining(&self) -> usize;

    /// 读取下一个字节但是不移动位置。已经到达末尾的时候返回 `None`
    fn peek_u8(&self) -> Option<u8>;

    /// 借用接下来的 `len` 个字节并移动位置
    fn read_slice(&mut self, len: usize) -> PlainBufferResult<&'a [u8]>;
}

impl<'a> SliceCursorExt<'a> for Cursor<&'a [u8]> {
    fn remaining(&self) -> usize {
        let len = self.get_ref().len();
        len.saturating_sub(self.position().min(len as u64) as usize)
    }

    fn peek_u8(&self) -> Option<u8> {
        let buf: &'a [u8] = *self.get_ref();
        buf.get(self.position() as usize).copied()
    }

    fn read_slice(&mut self, len: usize) -> PlainBufferResult<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(PlainBufferError::TruncatedInput(format!(
                "need {} bytes at offset {}, only {} left",
                len,
                self.position(),
                remaining
            )));
        }

        let buf: &'a [u8] = *self.get_ref();
        let start = self.position() as usize;
        self.set_position((start + len) as u64);

        Ok(&buf[start..start + len])
    }
}

/// 把长度转换为 4 字节的长度前缀
pub(crate) fn length_prefix(len: usize) -> PlainBufferResult<u32> {
    u32::try_from(len).map_err(|_| PlainBufferError::FieldTooLarge(len))
}
