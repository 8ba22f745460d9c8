//! Aliyun plain buffer. See <https://help.aliyun.com/zh/tablestore/developer-reference/plainbuffer> for more details.
//!
//! - plain buffer 中涉及到数值的，包括整数、浮点数，都是用小端序（Little Endian）排列。
//! - plain buffer 中涉及到字符串的，都是用 UTF-8 编码表示。
//! - plain buffer 中的 Cell 是指：
//!   - 主键中的一个列和其值的组合
//!   - 数据中的一个列和其值的组合
//! - 一个 buffer 中可以有多行，行与行之间没有分隔符，也没有行数，每一行以行校验码结束
//!
//! | Value | Bytes | Description |
//! | ----  | ----- | ----------- |
//! | `0x75u32` | 4 | HEADER，只在 buffer 开头出现一次 |
//! | `0x01u8`| 1 | TAG_ROW_PK |
//! | `0x03u8` | 1 | TAG_CELL |
//! | `0x04u8` | 1 | TAG_CELL_NAME |
//! | `<name-len>u32` | 4 | cell name length |
//! | `<name-bytes>` | variant length | cell name |
//! | `0x05u8` | 1 | TAG_CELL_VALUE. **optional** |
//! | `<prefix>u32` | 4 | cell value prefix |
//! | `<variant>u8` | 1 | cell value type. See the following `VT_` constants |
//! | `<variant>u32` | 4 | string/blob length. **optional** |
//! | `<value-bytes>` | variant length | cell value. **optional** |
//! | `0x06u8` | 1 | TAG_CELL_TYPE. **optional** |
//! | `0x01u8` or `0x03u8` or `0x04u8`  | 1 | cell op. DELETE_ALL_VERSION, DELETE_ONE_VERSION or INCREMENT |
//! | `0x07u8` | 1 | TAG_CELL_TIMESTAMP. **optional** |
//! | `<variant>i64` | 8 | cell timestamp value in milliseconds |
//! | `0x0Au8` | 1 | TAG_CELL_CHECKSUM |
//! | `<variant>u8` | 1 | cell checksum |
//! | `0x02u8` | 1 | TAG_ROW_DATA. 没有数据列的时候不输出 |
//! | ... | ... | 循环 TAG_CELL 到 cell checksum |
//! | `0x08u8` | 1 | TAG_DELETE_ROW_MARKER. **optional** |
//! | `0x09u8` | 1 | TAG_ROW_CHECKSUM |
//! | `<variant>u8` | 1 | row checksum |
//!
//! cell value prefix 实际上是指类型字节加上值的内容一共占多少字节（不包含 prefix 自己的 4 个字节）
//!
//! - 整数及双精：1 字节类型 + 8 字节数据 = 9
//! - 字符串：1 字节类型 + 4 字节长度 + 内容长度
//! - BLOB: 1 字节类型 + 4 字节长度 + 内容长度
//! - 布尔值：1 字节类型 + 1 字节值 = 2
//! - InfMin, InfMax, AutoIncrement: 1 字节类型 = 1
//! - prefix 为 0 的时候表示 NULL，没有类型字节
//!
//! 校验码：
//!
//! - cell 校验码依次计算：名称字节、值（类型字节 + 内容，不含 prefix）、时间戳的 8 个字节、操作类型字节。
//!   注意写出顺序是先操作类型后时间戳，但是计算校验码的时候时间戳在前。
//! - 行校验码依次计算：每个主键 cell 的校验码、每个数据 cell 的校验码、删除标记（有则为 1，否则为 0）。

pub const LITTLE_ENDIAN_32_SIZE: usize = 4;
pub const LITTLE_ENDIAN_64_SIZE: usize = 8;

pub const HEADER: u32 = 0x75;

// tag types
pub const TAG_ROW_PK: u8 = 0x01;
pub const TAG_ROW_DATA: u8 = 0x02;
pub const TAG_CELL: u8 = 0x03;
pub const TAG_CELL_NAME: u8 = 0x04;
pub const TAG_CELL_VALUE: u8 = 0x05;
pub const TAG_CELL_TYPE: u8 = 0x06;
pub const TAG_CELL_TIMESTAMP: u8 = 0x07;
pub const TAG_DELETE_ROW_MARKER: u8 = 0x08;
pub const TAG_ROW_CHECKSUM: u8 = 0x09;
pub const TAG_CELL_CHECKSUM: u8 = 0x0A;

// 行扩展（sequence info）。目前不支持，解码时遇到会报 UnexpectedTag
pub const TAG_EXTENSION: u8 = 0x0B;
pub const TAG_SEQ_INFO: u8 = 0x0C;
pub const TAG_SEQ_INFO_EPOCH: u8 = 0x0D;
pub const TAG_SEQ_INFO_TS: u8 = 0x0E;
pub const TAG_SEQ_INFO_ROW_INDEX: u8 = 0x0F;

// cell operation types
pub const DELETE_ALL_VERSION: u8 = 0x01;
pub const DELETE_ONE_VERSION: u8 = 0x03;
pub const INCREMENT: u8 = 0x04;

// variant types
pub const VT_INTEGER: u8 = 0x00;
pub const VT_DOUBLE: u8 = 0x01;
pub const VT_BOOLEAN: u8 = 0x02;
pub const VT_STRING: u8 = 0x03;
pub const VT_NULL: u8 = 0x06;
pub const VT_BLOB: u8 = 0x07;
pub const VT_INF_MIN: u8 = 0x09;
pub const VT_INF_MAX: u8 = 0x0A;
pub const VT_AUTO_INCREMENT: u8 = 0x0B;
