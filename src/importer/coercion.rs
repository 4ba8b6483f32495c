// ==========================================
// EnerjiOS 导入管道 - 类型转换
// ==========================================
// 职责: 原始单元格 → 目标字段类型
// 规则: 数值接受 '.' 与 ',' 小数分隔符（土耳其市场）
//       日期接受 Excel 序列号与常见文本格式
// 红线: 失败返回错误分类,不使用 NaN/空值占位
// ==========================================

use crate::domain::cell::{format_number, CellValue};
use crate::domain::mapping::ColumnMapping;
use crate::domain::preview::ErrorKind;
use crate::domain::schema::DataType;
use crate::i18n::t_with_args;
use crate::importer::normalizer::normalize_label;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// 转换失败（按产生方式分类）
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl CoercionFailure {
    fn invalid_type(key: &str, raw: &str) -> Self {
        Self {
            kind: ErrorKind::InvalidType,
            message: t_with_args(key, &[("value", raw)]),
        }
    }

    fn invalid_value(message: String) -> Self {
        Self {
            kind: ErrorKind::InvalidValue,
            message,
        }
    }
}

/// 接受的文本日期格式
const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%Y.%m.%d", "%Y%m%d",
];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Excel 1900 日期系统的最大序列号（9999-12-31）
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// 转换单元格
///
/// # 返回
/// - Ok(None): 空白单元格
/// - Ok(Some(value)): 转换后的 JSON 值
/// - Err(CoercionFailure): 类型不符 / 值不在允许范围
pub fn coerce(cell: &CellValue, mapping: &ColumnMapping) -> Result<Option<Value>, CoercionFailure> {
    if cell.is_blank() {
        return Ok(None);
    }

    let value = match mapping.data_type {
        DataType::Text => Value::String(cell.as_trimmed_text().unwrap_or_default()),
        DataType::Number => {
            let n = coerce_number(cell, "validation.invalid_number")?;
            check_bounds(n, mapping)?;
            number_value(n)
        }
        DataType::Integer => {
            let n = coerce_number(cell, "validation.invalid_integer")?;
            if n.fract() != 0.0 {
                return Err(CoercionFailure::invalid_type(
                    "validation.invalid_integer",
                    &cell.to_string(),
                ));
            }
            check_bounds(n, mapping)?;
            number_value(n)
        }
        DataType::Boolean => Value::Bool(coerce_bool(cell)?),
        DataType::Enum => Value::String(coerce_enum(cell, &mapping.enum_values)?),
        DataType::Date => {
            let date = coerce_date(cell)?;
            Value::String(date.format("%Y-%m-%d").to_string())
        }
    };
    Ok(Some(value))
}

fn coerce_number(cell: &CellValue, error_key: &str) -> Result<f64, CoercionFailure> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Ok(*n),
        other => {
            let raw = other.to_string();
            parse_number(&raw).ok_or_else(|| CoercionFailure::invalid_type(error_key, raw.trim()))
        }
    }
}

/// 解析数值文本
///
/// - 同时出现 '.' 与 ',' 时,最后出现的是小数分隔符,另一个是千位分隔符
/// - 只出现一种且出现多次时,视为千位分隔符
/// - 去除空白与货币符号（₺ TL $ € %）
pub fn parse_number(raw: &str) -> Option<f64> {
    let mut s: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '₺' | '$' | '€' | '%'))
        .collect();

    let upper = s.to_ascii_uppercase();
    if upper.ends_with("TL") {
        s.truncate(s.len() - 2);
    } else if upper.starts_with("TL") {
        s = s[2..].to_string();
    }
    if s.is_empty() {
        return None;
    }

    let normalized = match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if comma > dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (None, Some(_)) => {
            if s.matches(',').count() > 1 {
                s.replace(',', "")
            } else {
                s.replace(',', ".")
            }
        }
        (Some(_), None) if s.matches('.').count() > 1 => s.replace('.', ""),
        _ => s,
    };

    // 只接受纯数字形式,拒绝 "inf" / "NaN" 之类
    if !normalized
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// 整数值输出为 JSON 整数（550 而不是 550.0）
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn check_bounds(n: f64, mapping: &ColumnMapping) -> Result<(), CoercionFailure> {
    let shown = format_number(n);
    if let Some(min) = mapping.constraints.min {
        if n < min {
            return Err(CoercionFailure::invalid_value(t_with_args(
                "validation.below_min",
                &[("value", shown.as_str()), ("min", format_number(min).as_str())],
            )));
        }
    }
    if let Some(max) = mapping.constraints.max {
        if n > max {
            return Err(CoercionFailure::invalid_value(t_with_args(
                "validation.above_max",
                &[("value", shown.as_str()), ("max", format_number(max).as_str())],
            )));
        }
    }
    Ok(())
}

fn coerce_bool(cell: &CellValue) -> Result<bool, CoercionFailure> {
    let raw = cell.to_string();
    match normalize_label(&raw).as_str() {
        "true" | "evet" | "yes" | "1" | "var" | "e" | "y" | "aktif" => Ok(true),
        "false" | "hayir" | "no" | "0" | "yok" | "h" | "n" | "pasif" => Ok(false),
        _ => Err(CoercionFailure::invalid_type(
            "validation.invalid_boolean",
            raw.trim(),
        )),
    }
}

/// 枚举值不区分大小写/变音符匹配,输出规范枚举值
fn coerce_enum(cell: &CellValue, enum_values: &[String]) -> Result<String, CoercionFailure> {
    let raw = cell.as_trimmed_text().unwrap_or_default();
    if enum_values.is_empty() {
        return Ok(raw);
    }
    let needle = normalize_label(&raw);
    enum_values
        .iter()
        .find(|v| normalize_label(v) == needle)
        .cloned()
        .ok_or_else(|| {
            CoercionFailure::invalid_value(t_with_args(
                "validation.invalid_enum",
                &[("value", raw.as_str()), ("allowed", enum_values.join(", ").as_str())],
            ))
        })
}

fn coerce_date(cell: &CellValue) -> Result<NaiveDate, CoercionFailure> {
    let parsed = match cell {
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        other => parse_date_text(&other.to_string()),
    };
    parsed.ok_or_else(|| CoercionFailure::invalid_type("validation.invalid_date", cell.to_string().trim()))
}

/// Excel 序列号 → 日期（1900 日期系统）
///
/// Excel 把 1900 年当作闰年: 序列号 60 是不存在的 1900-02-29,
/// 60 之前的序列号以 1899-12-31 为 0,之后以 1899-12-30 为 0
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_MAX_SERIAL {
        return None;
    }
    let days = serial.floor() as i64;
    let epoch = match days {
        1..=59 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        60 => return None,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    epoch.checked_add_signed(Duration::days(days))
}

/// 文本日期的最小年份（拒绝 "31.12.26" 这类两位年份）
const MIN_TEXT_YEAR: i32 = 1900;

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= MIN_TEXT_YEAR).then_some(date)
}

/// 解析文本日期
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Some(date) = NaiveDate::parse_from_str(value, fmt).ok().and_then(plausible) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Some(date) = NaiveDateTime::parse_from_str(value, fmt)
            .ok()
            .and_then(|dt| plausible(dt.date()))
        {
            return Some(date);
        }
    }
    if let Some(date) = DateTime::parse_from_rfc3339(value)
        .ok()
        .and_then(|dt| plausible(dt.date_naive()))
    {
        return Some(date);
    }

    // 以文本保存的序列号
    value.parse::<f64>().ok().and_then(excel_serial_to_date)
}
