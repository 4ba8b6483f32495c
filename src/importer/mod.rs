// ==========================================
// EnerjiOS 导入管道 - 导入层
// ==========================================
// 职责: 解析、自动映射、范围过滤、映射编辑、校验转换、问题导出
// 支持: xlsx / xlsm / xls
// ==========================================

// 模块声明
pub mod auto_mapper;
pub mod coercion;
pub mod error;
pub mod error_export;
pub mod file_parser;
pub mod import_pipeline_trait;
pub mod json_sink;
pub mod mapping_editor;
pub mod normalizer;
pub mod range_filter;
pub mod validator;

// 重导出核心类型
pub use auto_mapper::{auto_map, auto_map_default, DEFAULT_AUTO_MAP_THRESHOLD};
pub use error::{ImportError, ImportResult, ParseError};
pub use error_export::{export_errors_csv, export_errors_csv_to_path, write_errors_csv};
pub use file_parser::{ExcelParser, DEFAULT_MAX_FILE_SIZE};
pub use json_sink::JsonFileSink;
pub use mapping_editor::MappingEditor;
pub use range_filter::RangeFilter;
pub use validator::{group_errors_by_type, validate};

// 重导出 Trait 接口
pub use import_pipeline_trait::{FileParser, ImportSink};
