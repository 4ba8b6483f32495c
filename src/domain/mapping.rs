// ==========================================
// EnerjiOS 导入管道 - 列映射
// ==========================================
// 职责: 源列 ↔ 目标字段 绑定记录
// 不变量: system_field 唯一, excel_index 唯一（后写覆盖）
// ==========================================

use crate::domain::schema::{DataType, FieldConstraints, SystemField};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub excel_column: String, // 源列表头
    pub excel_index: usize,   // 源列下标
    pub system_field: String, // 目标字段 id
    pub required: bool,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub constraints: FieldConstraints,
}

impl ColumnMapping {
    /// 由目标字段定义 + 源列构造映射（复制字段的类型与约束）
    pub fn from_field(field: &SystemField, excel_column: impl Into<String>, excel_index: usize) -> Self {
        Self {
            excel_column: excel_column.into(),
            excel_index,
            system_field: field.id.clone(),
            required: field.required,
            data_type: field.data_type,
            enum_values: field.enum_values.clone(),
            unique: field.unique,
            constraints: field.constraints.clone(),
        }
    }
}
