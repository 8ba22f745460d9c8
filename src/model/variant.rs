use std::{
    fmt::{Display, Formatter},
    io::{Cursor, Write},
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    PlainBufferResult,
    crc8::{crc_bytes, crc_f64, crc_i64, crc_u8, crc_u32},
    error::PlainBufferError,
    protos::plain_buffer::{
        LITTLE_ENDIAN_32_SIZE, LITTLE_ENDIAN_64_SIZE, VT_AUTO_INCREMENT, VT_BLOB, VT_BOOLEAN, VT_DOUBLE, VT_INF_MAX, VT_INF_MIN, VT_INTEGER, VT_NULL,
        VT_STRING,
    },
    util::{SliceCursorExt, length_prefix},
};

/// 列值的类型，取值就是写入 plain buffer 的类型字节
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VariantType {
    Integer = VT_INTEGER,
    Double = VT_DOUBLE,
    Boolean = VT_BOOLEAN,
    String = VT_STRING,
    Null = VT_NULL,
    Blob = VT_BLOB,
    InfMin = VT_INF_MIN,
    InfMax = VT_INF_MAX,
    AutoIncrement = VT_AUTO_INCREMENT,
}

impl VariantType {
    /// 无穷小、无穷大和自增这几个类型只有类型字节，没有值
    pub fn is_marker(&self) -> bool {
        matches!(self, Self::InfMin | Self::InfMax | Self::AutoIncrement)
    }
}

impl From<VariantType> for u8 {
    fn from(vt: VariantType) -> Self {
        vt as u8
    }
}

impl TryFrom<u8> for VariantType {
    type Error = PlainBufferError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            VT_INTEGER => Ok(Self::Integer),
            VT_DOUBLE => Ok(Self::Double),
            VT_BOOLEAN => Ok(Self::Boolean),
            VT_STRING => Ok(Self::String),
            VT_NULL => Ok(Self::Null),
            VT_BLOB => Ok(Self::Blob),
            VT_INF_MIN => Ok(Self::InfMin),
            VT_INF_MAX => Ok(Self::InfMax),
            VT_AUTO_INCREMENT => Ok(Self::AutoIncrement),
            _ => Err(PlainBufferError::UnsupportedVariantType(value)),
        }
    }
}

impl Display for VariantType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Integer => "INTEGER",
            Self::Double => "DOUBLE",
            Self::Boolean => "BOOLEAN",
            Self::String => "STRING",
            Self::Null => "NULL",
            Self::Blob => "BLOB",
            Self::InfMin => "INF_MIN",
            Self::InfMax => "INF_MAX",
            Self::AutoIncrement => "AUTO_INCREMENT",
        };

        write!(f, "{}", s)
    }
}

/// 列值。每个类型只携带它允许的数据。
///
/// `Null` 只会在解码的时候出现（值的长度前缀为 0），编码行的时候主键和数据列都不允许使用。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    Blob(Vec<u8>),
    InfMin,
    InfMax,
    AutoIncrement,
}

impl CellValue {
    pub fn variant_type(&self) -> VariantType {
        match self {
            Self::Null => VariantType::Null,
            Self::Integer(_) => VariantType::Integer,
            Self::Double(_) => VariantType::Double,
            Self::Boolean(_) => VariantType::Boolean,
            Self::String(_) => VariantType::String,
            Self::Blob(_) => VariantType::Blob,
            Self::InfMin => VariantType::InfMin,
            Self::InfMax => VariantType::InfMax,
            Self::AutoIncrement => VariantType::AutoIncrement,
        }
    }

    /// 值的 prefix 中记录的长度：类型字节 + 内容，不包含 prefix 自己
    pub(crate) fn payload_size(&self) -> usize {
        match self {
            Self::Null => 0,

            // 8 bytes for i64 / f64
            Self::Integer(_) | Self::Double(_) => 1 + LITTLE_ENDIAN_64_SIZE,

            Self::Boolean(_) => 2,

            // 4 bytes for length, and n bytes for content
            Self::String(s) => 1 + LITTLE_ENDIAN_32_SIZE + s.len(),
            Self::Blob(buf) => 1 + LITTLE_ENDIAN_32_SIZE + buf.len(),

            Self::InfMin | Self::InfMax | Self::AutoIncrement => 1,
        }
    }

    /// 计算写出 plain buffer 的字节数量。
    /// 包含 4 字节的 prefix，*不包含* TAG_CELL_VALUE 1 byte
    pub fn compute_size(&self) -> usize {
        LITTLE_ENDIAN_32_SIZE + self.payload_size()
    }

    /// Write prefix, variant type and content to cursor *WITHOUT* TAG_CELL_VALUE byte.
    pub(crate) fn write_plain_buffer(&self, cursor: &mut Cursor<Vec<u8>>) -> PlainBufferResult<()> {
        cursor.write_u32::<LittleEndian>(length_prefix(self.payload_size())?)?;

        match self {
            Self::Null => {}

            Self::Integer(n) => {
                cursor.write_u8(VT_INTEGER)?;
                cursor.write_i64::<LittleEndian>(*n)?;
            }

            Self::Double(d) => {
                cursor.write_u8(VT_DOUBLE)?;
                cursor.write_f64::<LittleEndian>(*d)?;
            }

            Self::Boolean(b) => {
                cursor.write_u8(VT_BOOLEAN)?;
                cursor.write_u8(if *b { 1u8 } else { 0u8 })?;
            }

            Self::String(s) => {
                cursor.write_u8(VT_STRING)?;
                cursor.write_u32::<LittleEndian>(length_prefix(s.len())?)?;
                cursor.write_all(s.as_bytes())?;
            }

            Self::Blob(buf) => {
                cursor.write_u8(VT_BLOB)?;
                cursor.write_u32::<LittleEndian>(length_prefix(buf.len())?)?;
                cursor.write_all(buf)?;
            }

            Self::InfMin => cursor.write_u8(VT_INF_MIN)?,
            Self::InfMax => cursor.write_u8(VT_INF_MAX)?,
            Self::AutoIncrement => cursor.write_u8(VT_AUTO_INCREMENT)?,
        }

        Ok(())
    }

    /// Fold the variant type and content into the checksum. Prefix is not included.
    pub(crate) fn crc8_checksum(&self, input_checksum: u8) -> u8 {
        let checksum = input_checksum;

        match self {
            Self::Null => checksum,

            Self::Integer(n) => crc_i64(crc_u8(checksum, VT_INTEGER), *n),
            Self::Double(d) => crc_f64(crc_u8(checksum, VT_DOUBLE), *d),
            Self::Boolean(b) => crc_u8(crc_u8(checksum, VT_BOOLEAN), if *b { 1u8 } else { 0u8 }),

            Self::String(s) => {
                let checksum = crc_u8(checksum, VT_STRING);
                let checksum = crc_u32(checksum, s.len() as u32);
                crc_bytes(checksum, s.as_bytes())
            }

            Self::Blob(buf) => {
                let checksum = crc_u8(checksum, VT_BLOB);
                let checksum = crc_u32(checksum, buf.len() as u32);
                crc_bytes(checksum, buf)
            }

            Self::InfMin => crc_u8(checksum, VT_INF_MIN),
            Self::InfMax => crc_u8(checksum, VT_INF_MAX),
            Self::AutoIncrement => crc_u8(checksum, VT_AUTO_INCREMENT),
        }
    }

    /// 从 prefix 之后的内容中解析值。`payload` 的长度就是 prefix 中的值
    pub(crate) fn read_plain_buffer(payload: &[u8]) -> PlainBufferResult<Self> {
        if payload.is_empty() {
            return Ok(Self::Null);
        }

        let mut cursor = Cursor::new(payload);
        let vt = VariantType::try_from(cursor.read_u8()?)?;

        let value = match vt {
            VariantType::Integer => Self::Integer(cursor.read_i64::<LittleEndian>()?),
            VariantType::Double => Self::Double(cursor.read_f64::<LittleEndian>()?),
            VariantType::Boolean => Self::Boolean(cursor.read_u8()? != 0),

            VariantType::String => {
                let len = cursor.read_u32::<LittleEndian>()? as usize;
                let bytes = cursor.read_slice(len)?;
                Self::String(String::from_utf8(bytes.to_vec())?)
            }

            VariantType::Blob => {
                let len = cursor.read_u32::<LittleEndian>()? as usize;
                Self::Blob(cursor.read_slice(len)?.to_vec())
            }

            // NULL 只能由长度为 0 的值表示
            VariantType::Null => return Err(PlainBufferError::UnsupportedVariantType(VT_NULL)),
            VariantType::InfMin => Self::InfMin,
            VariantType::InfMax => Self::InfMax,
            VariantType::AutoIncrement => Self::AutoIncrement,
        };

        Ok(value)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for CellValue {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<u8>> for CellValue {
    fn from(buf: Vec<u8>) -> Self {
        Self::Blob(buf)
    }
}

impl From<&[u8]> for CellValue {
    fn from(buf: &[u8]) -> Self {
        Self::Blob(buf.to_vec())
    }
}

#[cfg(test)]
mod test_variant {
    use std::io::Cursor;

    use crate::{crc8::crc_bytes, error::PlainBufferError};

    use super::{CellValue, VariantType};

    fn encode(value: &CellValue) -> Vec<u8> {
        let mut cursor = Cursor::new(vec![]);
        value.write_plain_buffer(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_encode_layout() {
        assert_eq!("09000000000100000000000000", hex::encode(encode(&CellValue::Integer(1))));
        assert_eq!("09000000013333333333735040", hex::encode(encode(&CellValue::Double(65.8))));
        assert_eq!("020000000201", hex::encode(encode(&CellValue::Boolean(true))));
        assert_eq!("020000000200", hex::encode(encode(&CellValue::Boolean(false))));
        assert_eq!("0900000003040000006e616d65", hex::encode(encode(&CellValue::from("name"))));
        assert_eq!("080000000703000000010203", hex::encode(encode(&CellValue::Blob(vec![1, 2, 3]))));
        assert_eq!("0100000009", hex::encode(encode(&CellValue::InfMin)));
        assert_eq!("010000000a", hex::encode(encode(&CellValue::InfMax)));
        assert_eq!("010000000b", hex::encode(encode(&CellValue::AutoIncrement)));
        assert_eq!("00000000", hex::encode(encode(&CellValue::Null)));
    }

    #[test]
    fn test_compute_size_matches_output() {
        let values = vec![
            CellValue::Null,
            CellValue::Integer(-7),
            CellValue::Double(3.5),
            CellValue::Boolean(false),
            CellValue::from("中文名称"),
            CellValue::from(vec![0u8; 300]),
            CellValue::InfMin,
            CellValue::InfMax,
            CellValue::AutoIncrement,
        ];

        for v in values {
            assert_eq!(v.compute_size(), encode(&v).len(), "{:?}", v);
        }
    }

    #[test]
    fn test_checksum_covers_type_and_content() {
        for v in [
            CellValue::Integer(42),
            CellValue::from("name"),
            CellValue::Boolean(true),
            CellValue::from(vec![9u8, 8, 7]),
            CellValue::AutoIncrement,
        ] {
            let bytes = encode(&v);
            // 跳过 4 字节的 prefix
            assert_eq!(crc_bytes(0x11, &bytes[4..]), v.crc8_checksum(0x11), "{:?}", v);
        }

        assert_eq!(0x11, CellValue::Null.crc8_checksum(0x11));
    }

    #[test]
    fn test_decode() {
        assert_eq!(CellValue::Null, CellValue::read_plain_buffer(&[]).unwrap());
        assert_eq!(CellValue::Integer(-1), CellValue::read_plain_buffer(&hex::decode("00ffffffffffffffff").unwrap()).unwrap());
        assert_eq!(CellValue::Boolean(true), CellValue::read_plain_buffer(&[0x02, 0x01]).unwrap());
        assert_eq!(CellValue::from("name"), CellValue::read_plain_buffer(&hex::decode("03040000006e616d65").unwrap()).unwrap());
        assert_eq!(CellValue::Blob(vec![1, 2, 3]), CellValue::read_plain_buffer(&hex::decode("0703000000010203").unwrap()).unwrap());
        assert_eq!(CellValue::InfMax, CellValue::read_plain_buffer(&[0x0A]).unwrap());
    }

    #[test]
    fn test_markers_carry_no_value() {
        for (byte, vt) in [(0x09u8, VariantType::InfMin), (0x0A, VariantType::InfMax), (0x0B, VariantType::AutoIncrement)] {
            let v = CellValue::read_plain_buffer(&[byte]).unwrap();
            assert_eq!(vt, v.variant_type());
            assert!(vt.is_marker());
            assert_eq!(5, v.compute_size());
        }
    }

    #[test]
    fn test_decode_errors() {
        let e = CellValue::read_plain_buffer(&[0x05]).unwrap_err();
        assert!(matches!(e, PlainBufferError::UnsupportedVariantType(0x05)));

        let e = CellValue::read_plain_buffer(&[0x06]).unwrap_err();
        assert!(matches!(e, PlainBufferError::UnsupportedVariantType(0x06)));

        // 字符串长度超过了 payload
        let e = CellValue::read_plain_buffer(&hex::decode("03ff0000006e616d65").unwrap()).unwrap_err();
        assert!(matches!(e, PlainBufferError::TruncatedInput(_)));

        let e = CellValue::read_plain_buffer(&[0x00, 0x01, 0x02]).unwrap_err();
        assert!(matches!(e, PlainBufferError::TruncatedInput(_)));

        let e = CellValue::read_plain_buffer(&[0x03, 0x02, 0x00, 0x00, 0x00, 0xC3, 0x28]).unwrap_err();
        assert!(matches!(e, PlainBufferError::InvalidUtf8(_)));
    }

    #[test]
    fn test_variant_type_tags() {
        for b in 0u8..=0xFF {
            match VariantType::try_from(b) {
                Ok(vt) => assert_eq!(b, u8::from(vt)),
                Err(e) => assert!(matches!(e, PlainBufferError::UnsupportedVariantType(x) if x == b)),
            }
        }

        assert_eq!("AUTO_INCREMENT", VariantType::AutoIncrement.to_string());
    }
}
