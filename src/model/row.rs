use std::io::Cursor;

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::{
    PlainBufferResult,
    codec::{PlainBufferCodec, encode_plain_buffer},
    crc8::crc_u8,
    error::{ChecksumScope, PlainBufferError, TagScope},
    protos::plain_buffer::{self, TAG_CELL, TAG_DELETE_ROW_MARKER, TAG_ROW_CHECKSUM, TAG_ROW_DATA, TAG_ROW_PK},
    util::SliceCursorExt,
};

use super::{
    Cell, CellValue,
    rules::{validate_attribute_type, validate_primary_key_type},
};

/// 宽表模型的行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// 主键列，顺序有意义
    pub primary_keys: Vec<Cell>,

    /// 数据列
    pub attributes: Vec<Cell>,

    /// 删除整行的标记
    pub delete_marker: bool,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个主键列
    pub fn primary_key(mut self, cell: Cell) -> Self {
        self.primary_keys.push(cell);

        self
    }

    /// 添加一个数据列
    pub fn attribute(mut self, cell: Cell) -> Self {
        self.attributes.push(cell);

        self
    }

    /// 设置删除标记
    pub fn delete_marker(mut self, delete_marker: bool) -> Self {
        self.delete_marker = delete_marker;

        self
    }

    /// 获取给定名称的主键的值
    pub fn get_primary_key_value(&self, name: &str) -> Option<&CellValue> {
        self.primary_keys.iter().find(|pk| pk.name.as_str() == name).and_then(|c| c.value.as_ref())
    }

    /// 获取给定名称的列的值, 适用于列在行中只出现一次的情况
    pub fn get_attribute_value(&self, name: &str) -> Option<&CellValue> {
        self.attributes.iter().find(|c| c.name.as_str() == name).and_then(|c| c.value.as_ref())
    }

    /// 检查主键列和数据列的值类型
    pub fn validate(&self) -> PlainBufferResult<()> {
        self.primary_keys.iter().try_for_each(validate_primary_key)?;
        self.attributes.iter().try_for_each(validate_attribute)
    }

    /// 计算一个行的 plain buffer 字节数量，不包含 buffer 的 header
    pub fn compute_size(&self) -> usize {
        // TAG_ROW_PK
        let mut size = 1 + self.primary_keys.iter().map(|c| c.compute_size()).sum::<usize>();

        if !self.attributes.is_empty() {
            size += 1 + self.attributes.iter().map(|c| c.compute_size()).sum::<usize>();
        }

        if self.delete_marker {
            size += 1;
        }

        // TAG_ROW_CHECKSUM + checksum
        size + 2
    }

    /// 输出只包含这一行的 plain buffer 的编码（包含 header），例如请求中的主键
    pub fn encode_plain_buffer(&self) -> PlainBufferResult<Vec<u8>> {
        encode_plain_buffer(std::slice::from_ref(self))
    }

    /// 解码只包含一行的 plain buffer，例如读取单行的响应。空的输入表示行不存在
    pub fn decode_plain_buffer(bytes: &[u8]) -> PlainBufferResult<Option<Self>> {
        PlainBufferCodec::default().decode_row(bytes)
    }

    pub(crate) fn write_plain_buffer(&self, cursor: &mut Cursor<Vec<u8>>, validate_types: bool) -> PlainBufferResult<()> {
        let Self {
            primary_keys,
            attributes,
            delete_marker,
        } = self;

        let mut checksum = 0u8;

        cursor.write_u8(TAG_ROW_PK)?;
        for key_col in primary_keys {
            if validate_types {
                validate_primary_key(key_col)?;
            }

            checksum = crc_u8(checksum, key_col.write_plain_buffer(cursor)?);
        }

        if !attributes.is_empty() {
            cursor.write_u8(TAG_ROW_DATA)?;

            for col in attributes {
                if validate_types {
                    validate_attribute(col)?;
                }

                checksum = crc_u8(checksum, col.write_plain_buffer(cursor)?);
            }
        }

        if *delete_marker {
            cursor.write_u8(TAG_DELETE_ROW_MARKER)?;
        }

        // 不管有没有写出删除标记，都要参与计算
        checksum = crc_u8(checksum, if *delete_marker { 1u8 } else { 0u8 });

        cursor.write_u8(TAG_ROW_CHECKSUM)?;
        cursor.write_u8(checksum)?;

        Ok(())
    }

    /// 从 TAG_ROW_PK 开始读取一行，直到行校验码
    pub(crate) fn read_plain_buffer(cursor: &mut Cursor<&[u8]>) -> PlainBufferResult<Self> {
        let tag = cursor.read_u8()?;
        if tag != TAG_ROW_PK {
            return Err(PlainBufferError::UnexpectedTag { tag, scope: TagScope::Row });
        }

        let mut checksum = 0u8;
        let primary_keys = read_cells(cursor, &mut checksum)?;
        let mut attributes = vec![];
        let mut delete_marker = false;

        loop {
            let tag = cursor.read_u8()?;

            match tag {
                plain_buffer::TAG_ROW_DATA => {
                    attributes.extend(read_cells(cursor, &mut checksum)?);
                }

                plain_buffer::TAG_DELETE_ROW_MARKER => {
                    delete_marker = true;
                    checksum = crc_u8(checksum, 1u8);
                }

                plain_buffer::TAG_ROW_CHECKSUM => {
                    if !delete_marker {
                        checksum = crc_u8(checksum, 0u8);
                    }

                    let received = cursor.read_u8()?;
                    if received != checksum {
                        log::debug!(
                            "row checksum mismatch. primary keys: {:?}, calculated: {:02x}, received: {:02x}",
                            primary_keys,
                            checksum,
                            received
                        );

                        return Err(PlainBufferError::ChecksumMismatch {
                            scope: ChecksumScope::Row,
                            calculated: checksum,
                            received,
                        });
                    }

                    break;
                }

                _ => return Err(PlainBufferError::UnexpectedTag { tag, scope: TagScope::Row }),
            }
        }

        Ok(Self {
            primary_keys,
            attributes,
            delete_marker,
        })
    }
}

/// 读取连续的 cell，直到下一个字节不是 TAG_CELL
fn read_cells(cursor: &mut Cursor<&[u8]>, row_checksum: &mut u8) -> PlainBufferResult<Vec<Cell>> {
    let mut cells = vec![];

    while cursor.peek_u8() == Some(TAG_CELL) {
        let (cell, cell_checksum) = Cell::read_plain_buffer(cursor)?;
        *row_checksum = crc_u8(*row_checksum, cell_checksum);
        cells.push(cell);
    }

    Ok(cells)
}

/// 没有值的列不检查
fn validate_primary_key(cell: &Cell) -> PlainBufferResult<()> {
    match cell.variant_type() {
        Some(vt) if !validate_primary_key_type(vt) => Err(PlainBufferError::InvalidPrimaryKeyType {
            name: cell.name.clone(),
            variant_type: vt,
        }),
        _ => Ok(()),
    }
}

fn validate_attribute(cell: &Cell) -> PlainBufferResult<()> {
    match cell.variant_type() {
        Some(vt) if !validate_attribute_type(vt) => Err(PlainBufferError::InvalidAttributeType {
            name: cell.name.clone(),
            variant_type: vt,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod test_row {
    use std::io::Cursor;

    use crate::{
        error::{ChecksumScope, PlainBufferError, TagScope},
        model::{Cell, CellOp, CellValue, VariantType},
        test_util::setup,
    };

    use super::Row;

    fn encode(row: &Row) -> Vec<u8> {
        let mut cursor = Cursor::new(vec![]);
        row.write_plain_buffer(&mut cursor, true).unwrap();
        cursor.into_inner()
    }

    fn decode(bytes: &[u8]) -> Result<Row, PlainBufferError> {
        let mut cursor = Cursor::new(bytes);
        Row::read_plain_buffer(&mut cursor)
    }

    #[test]
    fn test_row_no_attribute() {
        setup();

        let row = Row::new().primary_key(Cell::with_integer_value("id", 1));
        let bytes = encode(&row);

        assert_eq!("01030402000000696405090000000001000000000000000a0a0982", hex::encode(&bytes));
        assert_eq!(bytes.len(), row.compute_size());
        assert_eq!(row, decode(&bytes).unwrap());
    }

    #[test]
    fn test_row_delete_marker() {
        setup();

        let row = Row::new()
            .primary_key(Cell::with_string_value("area", "a1"))
            .primary_key(Cell::with_integer_value("id", 2))
            .delete_marker(true);

        let bytes = encode(&row);
        assert_eq!(
            "01030404000000617265610507000000030200000061310a6b030402000000696405090000000002000000000000000a3f080914",
            hex::encode(&bytes)
        );

        let decoded = decode(&bytes).unwrap();
        assert!(decoded.delete_marker);
        assert!(decoded.attributes.is_empty());
        assert_eq!(row, decoded);
    }

    #[test]
    fn test_delete_marker_flip_breaks_row_checksum() {
        let row = Row::new().primary_key(Cell::with_integer_value("id", 1));
        let mut bytes = encode(&row);

        // 在行校验码之前插入删除标记，但是不更新校验码
        let n = bytes.len();
        bytes.insert(n - 2, 0x08);

        let e = decode(&bytes).unwrap_err();
        assert!(matches!(e, PlainBufferError::ChecksumMismatch { scope: ChecksumScope::Row, .. }));

        // 反过来，去掉删除标记
        let row = row.delete_marker(true);
        let mut bytes = encode(&row);
        let n = bytes.len();
        bytes.remove(n - 3);

        let e = decode(&bytes).unwrap_err();
        assert!(matches!(e, PlainBufferError::ChecksumMismatch { scope: ChecksumScope::Row, .. }));
    }

    #[test]
    fn test_op_only_attribute() {
        let row = Row::new()
            .primary_key(Cell::with_string_value("area", "a1"))
            .primary_key(Cell::with_integer_value("id", 20000))
            .attribute(Cell::delete_all_versions("pass"));

        let bytes = encode(&row);
        assert_eq!(
            "01030404000000617265610507000000030200000061310a6b0304020000006964050900000000204e0000000000000a14020304040000007061737306010a9d09de",
            hex::encode(&bytes)
        );

        let decoded = decode(&bytes).unwrap();
        let pass = &decoded.attributes[0];
        assert_eq!("pass", pass.name);
        assert_eq!(Some(CellOp::DeleteAllVersions), pass.op);
        assert_eq!(None, pass.value);
        assert_eq!(None, pass.timestamp);
    }

    #[test]
    fn test_invalid_types() {
        let row = Row::new().primary_key(Cell::with_double_value("score", 1.5));
        let e = row.write_plain_buffer(&mut Cursor::new(vec![]), true).unwrap_err();
        assert!(matches!(e, PlainBufferError::InvalidPrimaryKeyType { variant_type: VariantType::Double, .. }));

        let row = Row::new().primary_key(Cell::with_bool_value("pass", true));
        assert!(matches!(row.validate(), Err(PlainBufferError::InvalidPrimaryKeyType { variant_type: VariantType::Boolean, .. })));

        let row = Row::new()
            .primary_key(Cell::with_integer_value("id", 1))
            .attribute(Cell::with_infinite_min("index"));
        let e = row.write_plain_buffer(&mut Cursor::new(vec![]), true).unwrap_err();
        assert!(matches!(e, PlainBufferError::InvalidAttributeType { variant_type: VariantType::InfMin, .. }));

        let row = Row::new().primary_key(Cell::with_integer_value("id", 1)).attribute(Cell::with_null("n"));
        assert!(matches!(row.validate(), Err(PlainBufferError::InvalidAttributeType { variant_type: VariantType::Null, .. })));

        // 不检查类型的时候可以写出
        let mut cursor = Cursor::new(vec![]);
        row.write_plain_buffer(&mut cursor, false).unwrap();
        let decoded = decode(cursor.get_ref()).unwrap();
        assert_eq!(Some(&CellValue::Null), decoded.get_attribute_value("n"));
    }

    #[test]
    fn test_empty_primary_key() {
        let row = Row::new().attribute(Cell::with_integer_value("level", 3));
        let bytes = encode(&row);
        assert_eq!(0x01, bytes[0]);
        assert_eq!(0x02, bytes[1]);

        let decoded = decode(&bytes).unwrap();
        assert!(decoded.primary_keys.is_empty());
        assert_eq!(row, decoded);
    }

    #[test]
    fn test_unexpected_tags() {
        let e = decode(&[0x02]).unwrap_err();
        assert!(matches!(e, PlainBufferError::UnexpectedTag { tag: 0x02, scope: TagScope::Row }));

        // 行扩展不支持
        let mut bytes = encode(&Row::new().primary_key(Cell::with_integer_value("id", 1)));
        let n = bytes.len();
        bytes.insert(n - 2, 0x0B);
        let e = decode(&bytes).unwrap_err();
        assert!(matches!(e, PlainBufferError::UnexpectedTag { tag: 0x0B, scope: TagScope::Row }));
    }

    #[test]
    fn test_truncated_row() {
        let bytes = encode(&Row::new().primary_key(Cell::with_integer_value("id", 1)).delete_marker(true));

        for n in 0..bytes.len() {
            let e = decode(&bytes[..n]).unwrap_err();
            assert!(matches!(e, PlainBufferError::TruncatedInput(_)), "len {}: {:?}", n, e);
        }
    }

    #[test]
    fn test_lookup() {
        let row = Row::new()
            .primary_key(Cell::with_string_value("school_id", "1"))
            .primary_key(Cell::with_integer_value("id", 1742373697699000))
            .attribute(Cell::with_string_value("name", "School-A").timestamp(1742378007415))
            .attribute(Cell::delete_all_versions("removed"));

        assert_eq!(Some(&CellValue::from("1")), row.get_primary_key_value("school_id"));
        assert_eq!(Some(&CellValue::Integer(1742373697699000)), row.get_primary_key_value("id"));
        assert_eq!(Some(&CellValue::from("School-A")), row.get_attribute_value("name"));
        assert_eq!(None, row.get_attribute_value("removed"));
        assert_eq!(None, row.get_attribute_value("missing"));
    }
}
