//! 阿里云表格存储（OTS）PlainBuffer 行格式的编码和解码。
//!
//! PlainBuffer 是表格存储在请求和响应中传递行数据的二进制格式：4 字节的 header 之后是连续的行，
//! 每一行包含主键列、可选的数据列、可选的删除标记以及行校验码；每一个列包含名称、可选的值、
//! 可选的操作类型和时间戳，以及列校验码。格式细节见 [`protos::plain_buffer`]。
//!
//! ```
//! use tablestore_plainbuffer::{Cell, Row, decode_plain_buffer, encode_plain_buffer};
//!
//! let rows = vec![
//!     Row::new()
//!         .primary_key(Cell::with_integer_value("id", 1))
//!         .attribute(Cell::with_string_value("name", "School-A")),
//! ];
//!
//! let bytes = encode_plain_buffer(&rows).unwrap();
//! assert_eq!(rows, decode_plain_buffer(&bytes).unwrap());
//! ```

use error::PlainBufferError;

pub mod codec;
pub mod crc8;
pub mod error;
pub mod model;
pub mod protos;

mod util;

#[cfg(test)]
pub(crate) mod test_util;

pub use codec::{PlainBufferCodec, PlainBufferOptions, compute_size, decode_plain_buffer, encode_plain_buffer};
pub use model::{Cell, CellOp, CellValue, Row, VariantType};

pub type PlainBufferResult<T> = Result<T, PlainBufferError>;
