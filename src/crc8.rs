//! CRC8 (多项式 0x07) 校验码计算。
//!
//! Plain buffer 中 cell 和 row 的校验码都用这里的函数计算。所有函数都是纯函数，
//! 可以把一次计算的结果作为下一次计算的输入，从而组合出 cell -> row 两级的校验树。

const POLYNOMIAL: u8 = 0x07;

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0usize;

    while i < 256 {
        let mut x = i as u8;
        let mut j = 0;

        while j < 8 {
            x = if x & 0x80 != 0 { (x << 1) ^ POLYNOMIAL } else { x << 1 };
            j += 1;
        }

        table[i] = x;
        i += 1;
    }

    table
}

/// 编译期生成的查找表，运行期只读
static CRC8_TABLE: [u8; 256] = build_table();

/// Fold one byte into `crc`
pub fn crc_u8(crc: u8, input: u8) -> u8 {
    CRC8_TABLE[(crc ^ input) as usize]
}

/// Fold bytes into `crc`, left to right
pub fn crc_bytes(crc: u8, input: &[u8]) -> u8 {
    input.iter().fold(crc, |c, b| crc_u8(c, *b))
}

pub fn crc_u32(crc: u8, input: u32) -> u8 {
    crc_bytes(crc, &input.to_le_bytes())
}

pub fn crc_i64(crc: u8, input: i64) -> u8 {
    crc_bytes(crc, &input.to_le_bytes())
}

pub fn crc_u64(crc: u8, input: u64) -> u8 {
    crc_bytes(crc, &input.to_le_bytes())
}

/// 按照小端序的 IEEE-754 字节计算
pub fn crc_f64(crc: u8, input: f64) -> u8 {
    crc_bytes(crc, &input.to_le_bytes())
}
