// ==========================================
// EnerjiOS 导入管道 - 校验与转换
// ==========================================
// 职责: 按映射逐行转换单元格,产出干净记录与问题清单
// 不变量: total_rows = valid_rows + invalid_rows
//         mapped_data.len() = valid_rows
// 红线: 单元格级问题只生成 ValidationError,从不返回 Err
// ==========================================

use crate::domain::cell::CellValue;
use crate::domain::mapping::ColumnMapping;
use crate::domain::preview::{
    ErrorKind, ImportPreview, ImportRecord, Severity, ValidationError,
};
use crate::i18n::t_with_args;
use crate::importer::coercion::coerce;
use crate::importer::range_filter::clamp_range;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

/// 校验选定范围
///
/// # 参数
/// - sheet_data: 工作表全部行（绝对行号）
/// - mappings: 当前列映射
/// - start_row / end_row: 闭区间,逆序视为空
/// - excluded_rows: 操作员排除的行
pub fn validate(
    sheet_data: &[Vec<CellValue>],
    mappings: &[ColumnMapping],
    start_row: usize,
    end_row: usize,
    excluded_rows: &BTreeSet<usize>,
) -> ImportPreview {
    let width = sheet_data.iter().map(|r| r.len()).max().unwrap_or(0);
    let (active, dangling): (Vec<&ColumnMapping>, Vec<&ColumnMapping>) =
        mappings.iter().partition(|m| m.excel_index < width);
    for m in &dangling {
        warn!(
            field = %m.system_field,
            excel_index = m.excel_index,
            width,
            "映射列不存在,按未映射处理"
        );
    }

    let mut preview = ImportPreview::default();
    // (字段 id, 转换后的值) → 首次出现行
    let mut seen: HashMap<(String, String), usize> = HashMap::new();

    for row_idx in clamp_range(sheet_data.len(), start_row, end_row) {
        if excluded_rows.contains(&row_idx) {
            continue;
        }
        let row = &sheet_data[row_idx];
        let mut record = ImportRecord::new();
        let mut row_findings: Vec<ValidationError> = Vec::new();

        for mapping in &active {
            let cell = row.get(mapping.excel_index).unwrap_or(&CellValue::Empty);
            let finding = |kind: ErrorKind, severity: Severity, message: String| ValidationError {
                row: row_idx,
                column: mapping.excel_column.clone(),
                field: mapping.system_field.clone(),
                message,
                severity,
                kind,
                related_row: None,
            };

            match coerce(cell, mapping) {
                Ok(None) => {
                    if mapping.required {
                        row_findings.push(finding(
                            ErrorKind::MissingRequired,
                            Severity::Error,
                            t_with_args(
                                "validation.missing_required",
                                &[("field", mapping.excel_column.as_str())],
                            ),
                        ));
                    } else {
                        record.insert(mapping.system_field.clone(), Value::Null);
                    }
                }
                Ok(Some(value)) => {
                    if let (Some(max), Value::String(s)) = (mapping.constraints.max_length, &value) {
                        let length = s.chars().count();
                        if length > max {
                            row_findings.push(finding(
                                ErrorKind::Warnings,
                                Severity::Warning,
                                t_with_args(
                                    "validation.too_long",
                                    &[
                                        ("length", length.to_string().as_str()),
                                        ("max", max.to_string().as_str()),
                                    ],
                                ),
                            ));
                        }
                    }

                    if mapping.unique {
                        let shown = cell.as_trimmed_text().unwrap_or_default();
                        let key = (mapping.system_field.clone(), duplicate_key(&value));
                        match seen.get(&key) {
                            Some(&first) => {
                                let mut dup = finding(
                                    ErrorKind::Duplicates,
                                    Severity::Warning,
                                    t_with_args(
                                        "validation.duplicate",
                                        &[
                                            ("value", shown.as_str()),
                                            ("first", (first + 1).to_string().as_str()),
                                        ],
                                    ),
                                );
                                dup.related_row = Some(first);
                                row_findings.push(dup);
                            }
                            None => {
                                seen.insert(key, row_idx);
                            }
                        }
                    }

                    record.insert(mapping.system_field.clone(), value);
                }
                Err(failure) => {
                    row_findings.push(finding(failure.kind, Severity::Error, failure.message));
                }
            }
        }

        preview.total_rows += 1;
        let row_invalid = row_findings.iter().any(|e| e.is_error());
        preview.warnings += row_findings.iter().filter(|e| !e.is_error()).count();
        if row_invalid {
            preview.invalid_rows += 1;
        } else {
            preview.valid_rows += 1;
            preview.mapped_data.push(record);
        }
        preview.errors.extend(row_findings);
    }

    debug!(
        total = preview.total_rows,
        valid = preview.valid_rows,
        invalid = preview.invalid_rows,
        warnings = preview.warnings,
        "校验完成"
    );
    preview
}

/// 重复判定键: 文本忽略大小写,其余按转换后的 JSON 值比较
fn duplicate_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    }
}

/// 按产生方式分组,每个分类键都存在（可能为空）
pub fn group_errors_by_type(errors: &[ValidationError]) -> BTreeMap<ErrorKind, Vec<ValidationError>> {
    let mut groups: BTreeMap<ErrorKind, Vec<ValidationError>> =
        ErrorKind::ALL.iter().map(|k| (*k, Vec::new())).collect();
    for e in errors {
        groups.entry(e.kind).or_default().push(e.clone());
    }
    groups
}
