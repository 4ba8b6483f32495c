// ==========================================
// ExcelParser 集成测试
// ==========================================
// 测试目标: 真实 xlsx 内容的解析、坐标、空表处理
// ==========================================

mod test_helpers;

use enerjios_import::importer::{ExcelParser, FileParser, ParseError};
use enerjios_import::{logging, CellValue};
use test_helpers::{product_workbook, xlsx_bytes, xlsx_bytes_at, PRODUCT_ROWS};

const EMPTY: &[&[&str]] = &[];

#[test]
fn test_parse_product_workbook() {
    logging::init_test();

    let workbook = ExcelParser::default()
        .parse("urunler.xlsx", &product_workbook())
        .unwrap();

    assert_eq!(workbook.file_name, "urunler.xlsx");
    assert_eq!(workbook.sheet_names(), vec!["Ürünler"]);

    let sheet = workbook.active().unwrap();
    assert_eq!(sheet.headers, vec!["Ürün Adı", "Stok Kodu", "Kategori", "Fiyat", "Para Birimi"]);
    assert_eq!(sheet.header_row, 0);
    assert_eq!(sheet.start_row, 1);
    assert_eq!(sheet.end_row, PRODUCT_ROWS.len() - 1);
    assert_eq!(sheet.data[1][3], CellValue::Number(4250.5));
    assert_eq!(sheet.data[2][1], CellValue::Text("SUN2000-10K".to_string()));
    // 中间空行保留
    assert!(sheet.data[3].iter().all(|c| c.is_blank()));
}

#[test]
fn test_offset_data_keeps_absolute_coordinates() {
    let rows: &[&[&str]] = &[&["Ad", "Fiyat"], &["Panel", "10"]];
    let bytes = xlsx_bytes_at(&[("Sayfa1", rows)], 2, 1);

    let workbook = ExcelParser::default().parse("kaydirilmis.xlsx", &bytes).unwrap();
    let sheet = workbook.active().unwrap();

    assert_eq!(sheet.data.len(), 4);
    assert_eq!(sheet.data[2][1], CellValue::Text("Ad".to_string()));
    assert_eq!(sheet.data[3][2], CellValue::Number(10.0));
    // 默认表头行为第 0 行（全空）,列名退化为列字母
    assert_eq!(sheet.headers, vec!["A", "B", "C"]);
}

#[test]
fn test_empty_sheets_are_skipped() {
    let rows: &[&[&str]] = &[&["Ad"], &["Panel"]];
    let bytes = xlsx_bytes(&[("Boş", EMPTY), ("Veri", rows)]);

    let workbook = ExcelParser::default().parse("iki.xlsx", &bytes).unwrap();

    assert_eq!(workbook.sheet_names(), vec!["Veri"]);
}

#[test]
fn test_all_empty_workbook() {
    let bytes = xlsx_bytes(&[("Boş", EMPTY)]);

    let err = ExcelParser::default().parse("bos.xlsx", &bytes).unwrap_err();

    assert!(matches!(err, ParseError::EmptyWorkbook));
}

#[test]
fn test_size_limit_checked_before_content() {
    let bytes = product_workbook();
    let limit = bytes.len() as u64 - 1;

    let err = ExcelParser::new(limit).parse("urunler.xlsx", &bytes).unwrap_err();

    assert!(matches!(err, ParseError::FileTooLarge { max, .. } if max == limit));
}

#[test]
fn test_extension_is_case_insensitive() {
    let workbook = ExcelParser::default().parse("URUNLER.XLSX", &product_workbook());
    assert!(workbook.is_ok());

    let err = ExcelParser::default()
        .parse("urunler.csv", &product_workbook())
        .unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedFormat(ext) if ext == "csv"));
}

#[test]
fn test_parse_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("urunler.xlsx");
    std::fs::write(&path, product_workbook()).unwrap();

    let workbook = ExcelParser::default().parse_path(&path).unwrap();

    assert_eq!(workbook.file_name, "urunler.xlsx");
    assert_eq!(workbook.active().unwrap().data.len(), PRODUCT_ROWS.len());
}
