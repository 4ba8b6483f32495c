// ==========================================
// EnerjiOS 导入管道 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xlsm/.xls)
// 红线: 不做类型转换,单元格保持原始值
// ==========================================

use crate::domain::cell::CellValue;
use crate::domain::workbook::{Sheet, Workbook};
use crate::importer::error::ParseError;
use crate::importer::import_pipeline_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// 参考实现的上传上限: 10 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// 可接受的扩展名（xlsx/xls 家族）
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "xls"];

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Debug, Clone)]
pub struct ExcelParser {
    max_file_size: u64,
}

impl ExcelParser {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// 从磁盘读取并解析
    pub fn parse_path<P: AsRef<Path>>(&self, path: P) -> Result<Workbook, ParseError> {
        let path = path.as_ref();

        // 先看文件大小,避免读入超大文件
        let size = std::fs::metadata(path)?.len();
        if size > self.max_file_size {
            return Err(ParseError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        self.parse(&file_name, &bytes)
    }
}

impl Default for ExcelParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl FileParser for ExcelParser {
    fn parse(&self, file_name: &str, bytes: &[u8]) -> Result<Workbook, ParseError> {
        // 检查大小
        let size = bytes.len() as u64;
        if size > self.max_file_size {
            return Err(ParseError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        // 检查扩展名
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ParseError::UnsupportedFormat(if ext.is_empty() {
                file_name.to_string()
            } else {
                ext
            }));
        }

        // 打开工作簿（按内容识别 xlsx/xls）
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name)?;
            let data = range_to_rows(&range);
            if data.is_empty() {
                debug!(sheet = %sheet_name, "跳过空工作表");
                continue;
            }
            debug!(sheet = %sheet_name, rows = data.len(), "工作表解析完成");
            sheets.push(Sheet::new(sheet_name, data));
        }

        if sheets.is_empty() {
            return Err(ParseError::EmptyWorkbook);
        }

        info!(file_name = %file_name, sheets = sheets.len(), "Excel 解析完成");
        Ok(Workbook::new(file_name, sheets))
    }
}

/// 将 calamine 区域展开为绝对坐标的行列表
///
/// 区域起点之前的空行/空列补 Empty,使行号与 Excel 中看到的一致
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let (start_row, start_col) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return Vec::new(),
    };

    let mut rows: Vec<Vec<CellValue>> = (0..start_row).map(|_| Vec::new()).collect();
    for data_row in range.rows() {
        let mut row = vec![CellValue::Empty; start_col];
        row.extend(data_row.iter().map(to_cell_value));
        rows.push(row);
    }

    // 去掉尾部空白行
    while rows.last().map_or(false, |r| r.iter().all(CellValue::is_blank)) {
        rows.pop();
    }
    rows
}

fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // 日期单元格保留 Excel 序列号,由校验器按目标类型转换
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
