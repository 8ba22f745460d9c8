use std::{
    fmt::{Display, Formatter},
    string::FromUtf8Error,
};

use thiserror::Error;

use crate::model::VariantType;

/// 解码时出现非预期 tag 的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScope {
    Buffer,
    Row,
    Cell,
}

impl Display for TagScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buffer => write!(f, "buffer"),
            Self::Row => write!(f, "row"),
            Self::Cell => write!(f, "cell"),
        }
    }
}

/// 校验失败的层级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumScope {
    Row,
    Cell,
}

impl Display for ChecksumScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Row => write!(f, "row"),
            Self::Cell => write!(f, "cell"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PlainBufferError {
    #[error("invalid plain buffer header: 0x{0:08X}")]
    InvalidHeader(u32),

    #[error("invalid primary key type {variant_type} of cell `{name}`")]
    InvalidPrimaryKeyType { name: String, variant_type: VariantType },

    #[error("invalid attribute type {variant_type} of cell `{name}`")]
    InvalidAttributeType { name: String, variant_type: VariantType },

    #[error("unexpected tag 0x{tag:02X} in {scope}")]
    UnexpectedTag { tag: u8, scope: TagScope },

    #[error("{scope} checksum validation failed. calculated: 0x{calculated:02X}, received: 0x{received:02X}")]
    ChecksumMismatch { scope: ChecksumScope, calculated: u8, received: u8 },

    #[error("unsupported variant type: 0x{0:02X}")]
    UnsupportedVariantType(u8),

    #[error("unsupported cell op: 0x{0:02X}")]
    UnsupportedCellOp(u8),

    #[error("truncated input: {0}")]
    TruncatedInput(String),

    #[error("{0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// 名称、字符串或者二进制内容超过了 4 字节长度前缀能表示的范围
    #[error("field too large for a 32-bit length prefix: {0} bytes")]
    FieldTooLarge(usize),

    #[error("plain buffer of {size} bytes exceeds the limit of {limit} bytes")]
    BufferTooLarge { size: usize, limit: usize },

    #[error("{0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for PlainBufferError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::TruncatedInput(e.to_string()),
            _ => Self::Io(e),
        }
    }
}
