// ==========================================
// EnerjiOS 导入管道 - 核心库
// ==========================================
// 流程: 上传 → 预览/范围 → 自动映射 → 映射编辑 → 校验 → 提交
// 系统定位: 操作员驱动的单会话导入（人工最终控制权）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "tr");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 工作簿、字段、映射、校验结果
pub mod domain;

// 导入层 - 解析、映射、校验、导出
pub mod importer;

// 引擎层 - 会话状态机与编排
pub mod engine;

// 配置层 - 导入参数
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    CellValue, ColumnMapping, DataType, ErrorKind, FieldConstraints, ImportPreview, ImportRecord,
    Severity, Sheet, SystemField, ValidationError, Workbook,
};

// 引擎
pub use engine::{ImportEvent, ImportOrchestrator, ImportOutcome, ImportStep};

// 导入层
pub use importer::{ExcelParser, ImportError, ImportResult, ImportSink, JsonFileSink, ParseError};

// 配置
pub use config::{ConfigManager, ImportConfigReader, ImportSettings};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "EnerjiOS Excel İçe Aktarma";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
