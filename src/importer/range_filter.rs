// ==========================================
// EnerjiOS 导入管道 - 范围与排除过滤
// ==========================================
// 职责: 表头行选择、导入范围、行排除、空行自动排除
// 红线: 自动空行检测只增加排除,从不移除操作员的排除
// ==========================================

use crate::domain::workbook::{derive_headers, Sheet};
use crate::importer::error::{ImportError, ImportResult};
use tracing::debug;

pub struct RangeFilter;

impl RangeFilter {
    /// 修改表头行
    ///
    /// # 规则
    /// - 重新推导 headers
    /// - start_row 重置为 header_row + 1
    /// - end_row 保持不变,除非已越界或小于 start_row（此时钳到最后一行）
    pub fn set_header_row(sheet: &mut Sheet, header_row: usize) -> ImportResult<()> {
        if header_row >= sheet.data.len() {
            return Err(ImportError::RowOutOfRange {
                row: header_row,
                rows: sheet.data.len(),
            });
        }

        sheet.header_row = header_row;
        sheet.headers = derive_headers(&sheet.data, header_row);
        sheet.start_row = header_row + 1;

        let last = sheet.last_row_index();
        if sheet.end_row > last || sheet.end_row < sheet.start_row {
            sheet.end_row = last;
        }

        debug!(
            sheet = %sheet.name,
            header_row,
            columns = sheet.headers.len(),
            start_row = sheet.start_row,
            end_row = sheet.end_row,
            "表头行已更新"
        );
        Ok(())
    }

    /// 修改导入范围（原样保存,逆序范围在读取时视为空）
    pub fn set_range(sheet: &mut Sheet, start_row: usize, end_row: usize) {
        sheet.start_row = start_row;
        sheet.end_row = end_row;
    }

    /// 切换单行排除状态,返回切换后是否被排除
    pub fn toggle_row(sheet: &mut Sheet, row: usize) -> ImportResult<bool> {
        if row >= sheet.data.len() {
            return Err(ImportError::RowOutOfRange {
                row,
                rows: sheet.data.len(),
            });
        }
        if sheet.excluded_rows.remove(&row) {
            Ok(false)
        } else {
            sheet.excluded_rows.insert(row);
            Ok(true)
        }
    }

    /// 批量设置排除状态（幂等）
    pub fn set_rows_excluded(sheet: &mut Sheet, rows: &[usize], exclude: bool) {
        for row in rows {
            if exclude {
                sheet.excluded_rows.insert(*row);
            } else {
                sheet.excluded_rows.remove(row);
            }
        }
    }

    /// 当前范围内实际存在的行（逆序或越界部分视为空）
    pub fn bounded_range(sheet: &Sheet) -> std::ops::Range<usize> {
        clamp_range(sheet.data.len(), sheet.start_row, sheet.end_row)
    }

    /// 检测范围内的空行（所有单元格为空或仅含空白）
    pub fn detect_empty_rows(sheet: &Sheet) -> Vec<usize> {
        Self::bounded_range(sheet)
            .filter(|idx| sheet.data[*idx].iter().all(|cell| cell.is_blank()))
            .collect()
    }

    /// 自动排除空行,返回新增排除的行数
    pub fn auto_exclude_empty_rows(sheet: &mut Sheet) -> usize {
        let empty_rows = Self::detect_empty_rows(sheet);
        let before = sheet.excluded_rows.len();
        Self::set_rows_excluded(sheet, &empty_rows, true);
        let added = sheet.excluded_rows.len() - before;
        if added > 0 {
            debug!(sheet = %sheet.name, added, "自动排除空行");
        }
        added
    }

    /// 校验时会被处理的行
    pub fn effective_rows(sheet: &Sheet) -> Vec<usize> {
        Self::bounded_range(sheet)
            .filter(|idx| !sheet.excluded_rows.contains(idx))
            .collect()
    }
}

/// [start, end] 与 [0, row_count) 的交集,表示为半开区间
pub fn clamp_range(row_count: usize, start_row: usize, end_row: usize) -> std::ops::Range<usize> {
    if row_count == 0 || start_row > end_row || start_row >= row_count {
        return 0..0;
    }
    let end = end_row.min(row_count - 1);
    start_row..end + 1
}
