use std::{
    fmt::{Display, Formatter},
    io::{Cursor, Write},
};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    PlainBufferResult,
    crc8::{crc_bytes, crc_i64, crc_u8},
    error::{ChecksumScope, PlainBufferError, TagScope},
    protos::plain_buffer::{
        self, DELETE_ALL_VERSION, DELETE_ONE_VERSION, INCREMENT, LITTLE_ENDIAN_32_SIZE, LITTLE_ENDIAN_64_SIZE, TAG_CELL, TAG_CELL_CHECKSUM, TAG_CELL_NAME,
        TAG_CELL_TIMESTAMP, TAG_CELL_TYPE, TAG_CELL_VALUE,
    },
    util::{SliceCursorExt, length_prefix},
};

use super::{CellValue, VariantType};

/// 列上的操作类型，用于更新行的时候告诉服务端如何处理这个列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellOp {
    /// 删除这个列的所有版本
    DeleteAllVersions = DELETE_ALL_VERSION,

    /// 删除这个列的指定版本，需要同时设置时间戳
    DeleteOneVersion = DELETE_ONE_VERSION,

    /// 原子加
    Increment = INCREMENT,
}

impl From<CellOp> for u8 {
    fn from(op: CellOp) -> Self {
        op as u8
    }
}

impl TryFrom<u8> for CellOp {
    type Error = PlainBufferError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            DELETE_ALL_VERSION => Ok(Self::DeleteAllVersions),
            DELETE_ONE_VERSION => Ok(Self::DeleteOneVersion),
            INCREMENT => Ok(Self::Increment),
            _ => Err(PlainBufferError::UnsupportedCellOp(value)),
        }
    }
}

impl Display for CellOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeleteAllVersions => write!(f, "DELETE_ALL_VERSION"),
            Self::DeleteOneVersion => write!(f, "DELETE_ONE_VERSION"),
            Self::Increment => write!(f, "INCREMENT"),
        }
    }
}

/// 一个列（主键列或者数据列）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// 列名
    pub name: String,

    /// 列值。`None` 表示 plain buffer 中没有 TAG_CELL_VALUE，例如只带删除操作的列
    pub value: Option<CellValue>,

    /// 操作类型
    pub op: Option<CellOp>,

    /// 时间戳（版本号），单位为毫秒
    pub timestamp: Option<i64>,
}

impl Cell {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_value(name: &str, value: impl Into<CellValue>) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn with_integer_value(name: &str, value: i64) -> Self {
        Self::with_value(name, CellValue::Integer(value))
    }

    pub fn with_double_value(name: &str, value: f64) -> Self {
        Self::with_value(name, CellValue::Double(value))
    }

    pub fn with_bool_value(name: &str, value: bool) -> Self {
        Self::with_value(name, CellValue::Boolean(value))
    }

    pub fn with_string_value(name: &str, value: impl Into<String>) -> Self {
        Self::with_value(name, CellValue::String(value.into()))
    }

    pub fn with_blob_value(name: &str, value: impl Into<Vec<u8>>) -> Self {
        Self::with_value(name, CellValue::Blob(value.into()))
    }

    pub fn with_null(name: &str) -> Self {
        Self::with_value(name, CellValue::Null)
    }

    /// 主键范围查询的起始或者结束使用
    pub fn with_infinite_min(name: &str) -> Self {
        Self::with_value(name, CellValue::InfMin)
    }

    pub fn with_infinite_max(name: &str) -> Self {
        Self::with_value(name, CellValue::InfMax)
    }

    /// 自增主键列，写入的时候由服务端生成值
    pub fn with_auto_increment(name: &str) -> Self {
        Self::with_value(name, CellValue::AutoIncrement)
    }

    /// 更新行的时候删除列的所有版本
    pub fn delete_all_versions(name: &str) -> Self {
        Self::new(name).op(CellOp::DeleteAllVersions)
    }

    /// 更新行的时候删除列的指定版本
    pub fn delete_one_version(name: &str, timestamp: i64) -> Self {
        Self::new(name).op(CellOp::DeleteOneVersion).timestamp(timestamp)
    }

    /// 更新行的时候对整数列做原子加
    pub fn increment(name: &str, delta: i64) -> Self {
        Self::with_integer_value(name, delta).op(CellOp::Increment)
    }

    /// 设置时间戳，单位毫秒
    pub fn timestamp(mut self, ts: i64) -> Self {
        self.timestamp = Some(ts);

        self
    }

    /// 设置操作类型
    pub fn op(mut self, op: CellOp) -> Self {
        self.op = Some(op);

        self
    }

    /// 值的类型。没有值的时候返回 `None`
    pub fn variant_type(&self) -> Option<VariantType> {
        self.value.as_ref().map(|v| v.variant_type())
    }

    /// 计算写出 plain buffer 的字节数量，从 TAG_CELL 到 cell checksum
    pub fn compute_size(&self) -> usize {
        // TAG_CELL + TAG_CELL_NAME + name length + name bytes
        let mut size = 2 + LITTLE_ENDIAN_32_SIZE + self.name.len();

        if let Some(v) = &self.value {
            size += 1 + v.compute_size();
        }

        if self.op.is_some() {
            size += 2;
        }

        if self.timestamp.is_some() {
            size += 1 + LITTLE_ENDIAN_64_SIZE;
        }

        // TAG_CELL_CHECKSUM + checksum
        size + 2
    }

    /// 计算列的校验码。
    ///
    /// 顺序固定为：名称、值、时间戳、操作类型。和写出的顺序（操作类型在时间戳之前）不一样。
    pub(crate) fn crc8_checksum(&self) -> u8 {
        let mut checksum = crc_bytes(0u8, self.name.as_bytes());

        if let Some(v) = &self.value {
            checksum = v.crc8_checksum(checksum);
        }

        if let Some(ts) = self.timestamp {
            checksum = crc_i64(checksum, ts);
        }

        if let Some(op) = self.op {
            checksum = crc_u8(checksum, op.into());
        }

        checksum
    }

    /// 写出列，返回列的校验码，用于计算行的校验码
    pub(crate) fn write_plain_buffer(&self, cursor: &mut Cursor<Vec<u8>>) -> PlainBufferResult<u8> {
        let Self { name, value, op, timestamp } = self;

        cursor.write_u8(TAG_CELL)?;

        cursor.write_u8(TAG_CELL_NAME)?;
        cursor.write_u32::<LittleEndian>(length_prefix(name.len())?)?;
        cursor.write_all(name.as_bytes())?;

        if let Some(v) = value {
            cursor.write_u8(TAG_CELL_VALUE)?;
            v.write_plain_buffer(cursor)?;
        }

        if let Some(op) = op {
            cursor.write_u8(TAG_CELL_TYPE)?;
            cursor.write_u8((*op).into())?;
        }

        if let Some(ts) = timestamp {
            cursor.write_u8(TAG_CELL_TIMESTAMP)?;
            cursor.write_i64::<LittleEndian>(*ts)?;
        }

        let checksum = self.crc8_checksum();
        cursor.write_u8(TAG_CELL_CHECKSUM)?;
        cursor.write_u8(checksum)?;

        Ok(checksum)
    }

    /// 从 TAG_CELL 开始读取一个列，返回列和列的校验码。
    ///
    /// 校验码按照读到的原始字节计算，校验通过之后才解析名称、值和操作类型。
    pub(crate) fn read_plain_buffer(cursor: &mut Cursor<&[u8]>) -> PlainBufferResult<(Self, u8)> {
        let tag = cursor.read_u8()?;
        if tag != TAG_CELL {
            return Err(PlainBufferError::UnexpectedTag { tag, scope: TagScope::Cell });
        }

        let mut name_bytes: &[u8] = &[];
        let mut value_bytes: Option<&[u8]> = None;
        let mut op_byte: Option<u8> = None;
        let mut timestamp: Option<i64> = None;
        let mut checksum = 0u8;

        loop {
            let tag = cursor.read_u8()?;

            match tag {
                plain_buffer::TAG_CELL_NAME => {
                    let len = cursor.read_u32::<LittleEndian>()? as usize;
                    name_bytes = cursor.read_slice(len)?;
                    checksum = crc_bytes(checksum, name_bytes);
                }

                plain_buffer::TAG_CELL_VALUE => {
                    let len = cursor.read_u32::<LittleEndian>()? as usize;
                    let bytes = cursor.read_slice(len)?;
                    checksum = crc_bytes(checksum, bytes);
                    value_bytes = Some(bytes);
                }

                plain_buffer::TAG_CELL_TYPE => {
                    op_byte = Some(cursor.read_u8()?);
                }

                plain_buffer::TAG_CELL_TIMESTAMP => {
                    let bytes = cursor.read_slice(LITTLE_ENDIAN_64_SIZE)?;
                    checksum = crc_bytes(checksum, bytes);
                    timestamp = Some(LittleEndian::read_i64(bytes));
                }

                plain_buffer::TAG_CELL_CHECKSUM => {
                    // 操作类型总是最后参与计算
                    if let Some(op) = op_byte {
                        checksum = crc_u8(checksum, op);
                    }

                    let received = cursor.read_u8()?;
                    if received != checksum {
                        log::debug!(
                            "cell checksum mismatch. name: {}, value: {}, calculated: {:02x}, received: {:02x}",
                            hex::encode(name_bytes),
                            hex::encode(value_bytes.unwrap_or_default()),
                            checksum,
                            received
                        );

                        return Err(PlainBufferError::ChecksumMismatch {
                            scope: ChecksumScope::Cell,
                            calculated: checksum,
                            received,
                        });
                    }

                    break;
                }

                _ => return Err(PlainBufferError::UnexpectedTag { tag, scope: TagScope::Cell }),
            }
        }

        let cell = Self {
            name: String::from_utf8(name_bytes.to_vec())?,
            value: value_bytes.map(CellValue::read_plain_buffer).transpose()?,
            op: op_byte.map(CellOp::try_from).transpose()?,
            timestamp,
        };

        log::trace!("cell read: {:?}, checksum: {:02x}", cell, checksum);

        Ok((cell, checksum))
    }
}
