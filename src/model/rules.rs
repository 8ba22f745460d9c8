use super::VariantType;

/// 主键列允许的值类型
pub const PRIMARY_KEY_TYPES: [VariantType; 6] = [
    VariantType::InfMin,
    VariantType::InfMax,
    VariantType::AutoIncrement,
    VariantType::Integer,
    VariantType::String,
    VariantType::Blob,
];

/// 数据列允许的值类型
pub const ATTRIBUTE_TYPES: [VariantType; 5] = [
    VariantType::Integer,
    VariantType::Double,
    VariantType::Boolean,
    VariantType::String,
    VariantType::Blob,
];

pub fn validate_primary_key_type(vt: VariantType) -> bool {
    PRIMARY_KEY_TYPES.contains(&vt)
}

pub fn validate_attribute_type(vt: VariantType) -> bool {
    ATTRIBUTE_TYPES.contains(&vt)
}
