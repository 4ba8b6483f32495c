// ==========================================
// EnerjiOS 导入管道 - 问题清单导出
// ==========================================
// 职责: ValidationError 列表 → CSV（操作员离线修正用）
// 格式: 表头固定,行号 1 基,严重级别 error/warning
// ==========================================

use crate::domain::preview::ValidationError;
use crate::importer::error::{ImportError, ImportResult};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// CSV 表头
pub const ERROR_CSV_HEADERS: [&str; 5] = [
    "Satır (Row)",
    "Sütun (Column)",
    "Alan (Field)",
    "Mesaj (Message)",
    "Önem (Severity)",
];

/// 写入任意 writer
pub fn write_errors_csv<W: Write>(writer: W, errors: &[ValidationError]) -> ImportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(ERROR_CSV_HEADERS)?;
    for e in errors {
        let row = e.display_row().to_string();
        wtr.write_record([
            row.as_str(),
            e.column.as_str(),
            e.field.as_str(),
            e.message.as_str(),
            e.severity.as_str(),
        ])?;
    }
    wtr.flush()
        .map_err(|e| ImportError::ExportError(e.to_string()))?;
    Ok(())
}

/// 导出为字符串
pub fn export_errors_csv(errors: &[ValidationError]) -> ImportResult<String> {
    let mut buf = Vec::new();
    write_errors_csv(&mut buf, errors)?;
    String::from_utf8(buf).map_err(|e| ImportError::ExportError(e.to_string()))
}

/// 导出到文件
pub fn export_errors_csv_to_path<P: AsRef<Path>>(path: P, errors: &[ValidationError]) -> ImportResult<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .map_err(|e| ImportError::ExportError(format!("{}: {}", path.display(), e)))?;
    write_errors_csv(file, errors)?;
    info!(path = %path.display(), count = errors.len(), "问题清单已导出");
    Ok(())
}
