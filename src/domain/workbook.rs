// ==========================================
// EnerjiOS 导入管道 - 工作簿与工作表
// ==========================================
// 职责: 解析后的内存工作簿 + 工作表导入范围状态
// 生命周期: 每次上传创建一次,重新上传时整体替换
// ==========================================

use crate::domain::cell::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// Sheet - 工作表
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub data: Vec<Vec<CellValue>>,    // 原始单元格（行优先）
    pub header_row: usize,            // 表头所在行
    pub headers: Vec<String>,         // 由 data[header_row] 推导
    pub start_row: usize,             // 导入范围起始行（含）
    pub end_row: usize,               // 导入范围结束行（含）
    pub excluded_rows: BTreeSet<usize>, // 跳过的行
}

impl Sheet {
    /// 以默认范围创建工作表: 第 0 行为表头,其余全部为数据
    pub fn new(name: impl Into<String>, data: Vec<Vec<CellValue>>) -> Self {
        let end_row = data.len().saturating_sub(1);
        let headers = derive_headers(&data, 0);
        Self {
            name: name.into(),
            data,
            header_row: 0,
            headers,
            start_row: 1,
            end_row,
            excluded_rows: BTreeSet::new(),
        }
    }

    /// 最后一行的下标（空表返回 0）
    pub fn last_row_index(&self) -> usize {
        self.data.len().saturating_sub(1)
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.data.get(index).map(|r| r.as_slice())
    }

    pub fn is_excluded(&self, row: usize) -> bool {
        self.excluded_rows.contains(&row)
    }
}

/// 从指定行推导表头
///
/// 列数取整张表最宽的一行;空白表头以列字母命名（A, B, ..., AA）
pub fn derive_headers(data: &[Vec<CellValue>], header_row: usize) -> Vec<String> {
    let Some(row) = data.get(header_row) else {
        return Vec::new();
    };
    let width = data.iter().map(|r| r.len()).max().unwrap_or(0);
    (0..width)
        .map(|idx| {
            row.get(idx)
                .and_then(|cell| cell.as_trimmed_text())
                .unwrap_or_else(|| column_letter(idx))
        })
        .collect()
}

/// 列下标 → 表格列字母（0 → A, 25 → Z, 26 → AA）
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

// ==========================================
// Workbook - 工作簿
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbook {
    pub file_name: String,
    pub sheets: Vec<Sheet>,
    active_sheet: usize,
}

impl Workbook {
    /// 创建工作簿（调用方保证 sheets 非空）
    pub fn new(file_name: impl Into<String>, sheets: Vec<Sheet>) -> Self {
        Self {
            file_name: file_name.into(),
            sheets,
            active_sheet: 0,
        }
    }

    pub fn active_sheet_index(&self) -> usize {
        self.active_sheet
    }

    /// 切换当前工作表,越界返回 false 且不修改状态
    pub fn select_sheet(&mut self, index: usize) -> bool {
        if index < self.sheets.len() {
            self.active_sheet = index;
            true
        } else {
            false
        }
    }

    pub fn active(&self) -> Option<&Sheet> {
        self.sheets.get(self.active_sheet)
    }

    pub fn active_mut(&mut self) -> Option<&mut Sheet> {
        self.sheets.get_mut(self.active_sheet)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::from(*c)).collect()
    }

    #[test]
    fn test_sheet_defaults() {
        let sheet = Sheet::new(
            "Ürünler",
            vec![text_row(&[" Ad ", "Fiyat"]), text_row(&["Panel", "10"])],
        );
        assert_eq!(sheet.header_row, 0);
        assert_eq!(sheet.headers, vec!["Ad", "Fiyat"]);
        assert_eq!(sheet.start_row, 1);
        assert_eq!(sheet.end_row, 1);
        assert!(sheet.excluded_rows.is_empty());
    }

    #[test]
    fn test_blank_header_named_by_letter() {
        let data = vec![vec![
            CellValue::from("Ad"),
            CellValue::Empty,
            CellValue::from("  "),
        ]];
        assert_eq!(derive_headers(&data, 0), vec!["Ad", "B", "C"]);
    }

    #[test]
    fn test_short_header_row_padded_to_widest_row() {
        let data = vec![text_row(&["Ad"]), text_row(&["Panel", "10", "x"])];
        assert_eq!(derive_headers(&data, 0), vec!["Ad", "B", "C"]);
        assert!(derive_headers(&data, 5).is_empty());
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
    }

    #[test]
    fn test_select_sheet_bounds() {
        let mut wb = Workbook::new(
            "a.xlsx",
            vec![Sheet::new("A", vec![]), Sheet::new("B", vec![])],
        );
        assert!(wb.select_sheet(1));
        assert_eq!(wb.active().unwrap().name, "B");
        assert!(!wb.select_sheet(2));
        assert_eq!(wb.active_sheet_index(), 1);
    }
}
