// ==========================================
// EnerjiOS 导入管道 - 校验结果
// ==========================================
// 职责: ValidationError / ImportPreview 定义
// 不变量: total_rows = valid_rows + invalid_rows
//         mapped_data.len() = valid_rows
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 导入记录: 目标字段 id → 转换后的值
pub type ImportRecord = serde_json::Map<String, serde_json::Value>;

// ==========================================
// Severity - 严重级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,   // 阻断提交,该行不进入 mapped_data
    Warning, // 仅提示
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// ErrorKind - 错误分类（由产生方式决定,不看消息文本）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingRequired,
    InvalidType,
    InvalidValue,
    Duplicates,
    Warnings,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::MissingRequired,
        ErrorKind::InvalidType,
        ErrorKind::InvalidValue,
        ErrorKind::Duplicates,
        ErrorKind::Warnings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequired => "missing_required",
            ErrorKind::InvalidType => "invalid_type",
            ErrorKind::InvalidValue => "invalid_value",
            ErrorKind::Duplicates => "duplicates",
            ErrorKind::Warnings => "warnings",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// ValidationError - 单元格级问题
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub row: usize,         // 0 基行号（展示时 +1）
    pub column: String,     // 源列表头
    pub field: String,      // 目标字段 id
    pub message: String,
    pub severity: Severity,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_row: Option<usize>, // 重复值首次出现的行（0 基）
}

impl ValidationError {
    /// 面向操作员的 1 基行号
    pub fn display_row(&self) -> usize {
        self.row + 1
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ==========================================
// ImportPreview - 校验器输出
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub warnings: usize,
    pub errors: Vec<ValidationError>,
    pub mapped_data: Vec<ImportRecord>,
}

impl ImportPreview {
    pub fn error_count(&self) -> usize {
        self.errors.iter().filter(|e| e.is_error()).count()
    }

    pub fn has_blocking_errors(&self) -> bool {
        self.errors.iter().any(|e| e.is_error())
    }

    /// 提交门槛: 无 error 级问题且有数据
    pub fn can_commit(&self) -> bool {
        !self.has_blocking_errors() && !self.mapped_data.is_empty()
    }
}
