//! Buffer 级别的编码和解码：4 字节的 header 之后是连续的行。

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    PlainBufferResult,
    error::{PlainBufferError, TagScope},
    model::Row,
    protos::plain_buffer::{HEADER, LITTLE_ENDIAN_32_SIZE},
    util::SliceCursorExt,
};

/// 编解码选项
#[derive(Debug, Clone)]
pub struct PlainBufferOptions {
    /// 允许的 buffer 最大字节数，对解码的输入和编码的输出都有效。`None` 表示不限制
    pub max_buffer_size: Option<usize>,

    /// 编码的时候是否检查主键列和数据列的值类型
    pub validate_types: bool,
}

impl PlainBufferOptions {
    pub fn new() -> Self {
        Self {
            max_buffer_size: None,
            validate_types: true,
        }
    }

    /// 设置 buffer 最大字节数
    pub fn max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = Some(max_buffer_size);

        self
    }

    /// 取消 buffer 大小的限制
    pub fn no_size_limit(mut self) -> Self {
        self.max_buffer_size = None;

        self
    }

    /// 设置编码的时候是否检查值类型。关闭之后可以写出服务端会拒绝的 buffer，一般只用于测试
    pub fn validate_types(mut self, validate_types: bool) -> Self {
        self.validate_types = validate_types;

        self
    }

    fn check_size(&self, size: usize) -> PlainBufferResult<()> {
        match self.max_buffer_size {
            Some(limit) if size > limit => Err(PlainBufferError::BufferTooLarge { size, limit }),
            _ => Ok(()),
        }
    }
}

impl Default for PlainBufferOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain buffer codec with options
#[derive(Debug, Clone, Default)]
pub struct PlainBufferCodec {
    options: PlainBufferOptions,
}

impl PlainBufferCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PlainBufferOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PlainBufferOptions {
        &self.options
    }

    /// 把多行编码为一个 plain buffer。先计算总长度，只分配一次内存
    pub fn encode(&self, rows: &[Row]) -> PlainBufferResult<Vec<u8>> {
        let size = compute_size(rows);
        self.options.check_size(size)?;

        let mut cursor = Cursor::new(Vec::with_capacity(size));
        cursor.write_u32::<LittleEndian>(HEADER)?;

        for row in rows {
            row.write_plain_buffer(&mut cursor, self.options.validate_types)?;
        }

        let bytes = cursor.into_inner();
        debug_assert_eq!(size, bytes.len());

        log::debug!("{} rows encoded into plain buffer of {} bytes", rows.len(), bytes.len());

        Ok(bytes)
    }

    /// 解码 plain buffer，直到读完所有的字节。任何一行失败整个解码都失败
    pub fn decode(&self, bytes: &[u8]) -> PlainBufferResult<Vec<Row>> {
        self.options.check_size(bytes.len())?;

        let mut cursor = Cursor::new(bytes);
        read_header(&mut cursor)?;

        let mut rows = vec![];
        while cursor.remaining() > 0 {
            rows.push(Row::read_plain_buffer(&mut cursor)?);
        }

        log::debug!("{} rows decoded from plain buffer of {} bytes", rows.len(), bytes.len());

        Ok(rows)
    }

    /// 解码最多只包含一行的 plain buffer。空的输入或者只有 header 表示行不存在，
    /// 读完一行之后还有剩余的字节则报告剩余的第一个字节
    pub fn decode_row(&self, bytes: &[u8]) -> PlainBufferResult<Option<Row>> {
        if bytes.is_empty() {
            return Ok(None);
        }

        self.options.check_size(bytes.len())?;

        let mut cursor = Cursor::new(bytes);
        read_header(&mut cursor)?;

        if cursor.remaining() == 0 {
            return Ok(None);
        }

        let row = Row::read_plain_buffer(&mut cursor)?;

        if let Some(tag) = cursor.peek_u8() {
            return Err(PlainBufferError::UnexpectedTag { tag, scope: TagScope::Buffer });
        }

        Ok(Some(row))
    }
}

fn read_header(cursor: &mut Cursor<&[u8]>) -> PlainBufferResult<()> {
    let header = cursor.read_u32::<LittleEndian>()?;

    if header != HEADER {
        return Err(PlainBufferError::InvalidHeader(header));
    }

    Ok(())
}

/// 计算多行编码之后的总字节数，包含 header
pub fn compute_size(rows: &[Row]) -> usize {
    LITTLE_ENDIAN_32_SIZE + rows.iter().map(|r| r.compute_size()).sum::<usize>()
}

/// 使用默认选项编码
pub fn encode_plain_buffer(rows: &[Row]) -> PlainBufferResult<Vec<u8>> {
    PlainBufferCodec::default().encode(rows)
}

/// 使用默认选项解码
pub fn decode_plain_buffer(bytes: &[u8]) -> PlainBufferResult<Vec<Row>> {
    PlainBufferCodec::default().decode(bytes)
}
