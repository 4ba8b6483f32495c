// ==========================================
// 校验器集成测试
// ==========================================
// 测试目标: 产品字段集上的类型转换、约束、重复值与计数不变量
// ==========================================

use enerjios_import::domain::schema::product_fields;
use enerjios_import::importer::{auto_map_default, group_errors_by_type, validate, RangeFilter};
use enerjios_import::{CellValue, ColumnMapping, ErrorKind, Severity, Sheet};
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn sheet(rows: &[&[&str]]) -> Sheet {
    let data = rows
        .iter()
        .map(|r| r.iter().map(|c| CellValue::from(*c)).collect())
        .collect();
    Sheet::new("Ürünler", data)
}

fn mapped(sheet: &Sheet) -> Vec<ColumnMapping> {
    auto_map_default(&sheet.headers, &product_fields())
}

fn run(sheet: &Sheet) -> enerjios_import::ImportPreview {
    validate(
        &sheet.data,
        &mapped(sheet),
        sheet.start_row,
        sheet.end_row,
        &sheet.excluded_rows,
    )
}

#[test]
fn test_product_row_coercion() {
    let s = sheet(&[
        &["Ürün Adı", "Kategori", "Fiyat", "Stok Adedi", "Aktif", "Geçerlilik Tarihi", "Garanti (Yıl)"],
        &["Jinko Tiger Neo", "Panel", "4.250,00", "120", "Evet", "31.12.2026", "25"],
        &["Huawei SUN2000", "inverter", "1200", "", "hayır", "2026-06-30", ""],
    ]);

    let preview = run(&s);

    assert!(preview.errors.is_empty(), "{:?}", preview.errors);
    let first = &preview.mapped_data[0];
    assert_eq!(first["name"], json!("Jinko Tiger Neo"));
    assert_eq!(first["category"], json!("panel"));
    assert_eq!(first["price"], json!(4250));
    assert_eq!(first["stock"], json!(120));
    assert_eq!(first["is_active"], json!(true));
    assert_eq!(first["valid_until"], json!("2026-12-31"));
    assert_eq!(first["warranty_years"], json!(25));

    let second = &preview.mapped_data[1];
    assert_eq!(second["is_active"], json!(false));
    assert_eq!(second["stock"], Value::Null);
    // 未映射字段不出现
    assert!(!second.contains_key("sku"));
}

#[test]
fn test_excel_serial_date() {
    let mut s = sheet(&[&["Ürün Adı", "Kategori", "Fiyat", "Geçerlilik Tarihi"], &["A", "panel", "1", "x"]]);
    s.data[1][3] = CellValue::Number(45677.0);

    let preview = run(&s);

    assert_eq!(preview.mapped_data[0]["valid_until"], json!("2025-01-20"));
}

#[test]
fn test_error_kinds_by_origin() {
    let s = sheet(&[
        &["Ürün Adı", "Kategori", "Fiyat", "Stok Adedi", "Garanti (Yıl)", "Geçerlilik Tarihi"],
        &["", "panel", "10", "1", "1", "2026-01-01"],          // missing_required
        &["B", "rüzgar", "10", "1", "1", "2026-01-01"],        // invalid_value (enum)
        &["C", "panel", "-5", "1", "1", "2026-01-01"],         // invalid_value (min)
        &["D", "panel", "10", "1,5", "1", "2026-01-01"],       // invalid_type (integer)
        &["E", "panel", "10", "1", "80", "2026-01-01"],        // invalid_value (max)
        &["F", "panel", "10", "1", "1", "yarın"],              // invalid_type (date)
    ]);

    let preview = run(&s);
    let groups = group_errors_by_type(&preview.errors);

    assert_eq!(preview.invalid_rows, 6);
    assert_eq!(groups[&ErrorKind::MissingRequired].len(), 1);
    assert_eq!(groups[&ErrorKind::InvalidValue].len(), 3);
    assert_eq!(groups[&ErrorKind::InvalidType].len(), 2);
    assert!(groups[&ErrorKind::Duplicates].is_empty());
    assert!(groups[&ErrorKind::Warnings].is_empty());
    assert!(preview.errors.iter().all(|e| e.severity == Severity::Error));
    assert_eq!(groups[&ErrorKind::MissingRequired][0].field, "name");
}

#[test]
fn test_row_with_several_problems_counted_once() {
    let s = sheet(&[
        &["Ürün Adı", "Kategori", "Fiyat"],
        &["", "rüzgar", "abc"],
    ]);

    let preview = run(&s);

    assert_eq!(preview.total_rows, 1);
    assert_eq!(preview.invalid_rows, 1);
    assert_eq!(preview.errors.len(), 3);
    assert!(preview.errors.iter().all(|e| e.row == 1));
}

#[test]
fn test_duplicate_sku_warns_but_keeps_rows() {
    let s = sheet(&[
        &["Ürün Adı", "Stok Kodu", "Kategori", "Fiyat"],
        &["A", "JKM-580", "panel", "1"],
        &["B", "X-1", "panel", "1"],
        &["C", " jkm-580 ", "panel", "1"],
    ]);

    let preview = run(&s);

    assert_eq!(preview.valid_rows, 3);
    assert_eq!(preview.mapped_data.len(), 3);
    assert_eq!(preview.warnings, 1);
    let dup = &preview.errors[0];
    assert_eq!(dup.kind, ErrorKind::Duplicates);
    assert_eq!((dup.row, dup.related_row), (3, Some(1)));
    assert!(preview.can_commit());
}

#[test]
fn test_empty_row_auto_excluded_not_counted() {
    let mut s = sheet(&[
        &["Ürün Adı", "Kategori", "Fiyat"],
        &["A", "panel", "1"],
        &["", "", ""],
        &["B", "panel", "2"],
    ]);
    RangeFilter::auto_exclude_empty_rows(&mut s);

    let preview = run(&s);

    assert_eq!(preview.total_rows, 2);
    assert_eq!(preview.valid_rows, 2);
}

#[test]
fn test_row_accounting_invariant() {
    let s = sheet(&[
        &["Ürün Adı", "Kategori", "Fiyat"],
        &["A", "panel", "1"],
        &["", "panel", "1"],
        &["C", "kablo", "1"],
        &["D", "cable", "x"],
        &["E", "cable", "3,75"],
    ]);
    let excluded: BTreeSet<usize> = [2].into_iter().collect();

    for (start, end) in [(1, 5), (2, 4), (5, 5), (4, 2), (0, 99)] {
        let preview = validate(&s.data, &mapped(&s), start, end, &excluded);
        assert_eq!(preview.valid_rows + preview.invalid_rows, preview.total_rows);
        assert_eq!(preview.mapped_data.len(), preview.valid_rows);
    }

    // 校验可重复执行,结果一致
    let a = run(&s);
    let b = run(&s);
    assert_eq!(a, b);
}
