// ==========================================
// EnerjiOS 导入管道 - 领域模型层
// ==========================================
// 职责: 定义工作簿、字段 schema、映射、校验结果
// 红线: 不含解析逻辑,不含编排逻辑
// ==========================================

pub mod cell;
pub mod mapping;
pub mod preview;
pub mod schema;
pub mod workbook;

// 重导出核心类型
pub use cell::CellValue;
pub use mapping::ColumnMapping;
pub use preview::{ErrorKind, ImportPreview, ImportRecord, Severity, ValidationError};
pub use schema::{DataType, FieldConstraints, SystemField};
pub use workbook::{Sheet, Workbook};
