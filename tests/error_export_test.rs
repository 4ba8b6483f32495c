// ==========================================
// 问题清单导出集成测试
// ==========================================

use enerjios_import::domain::schema::product_fields;
use enerjios_import::importer::{auto_map_default, export_errors_csv_to_path, validate};
use enerjios_import::{CellValue, Sheet};

#[test]
fn test_export_to_file_round_trips_through_csv_reader() {
    let data = vec![
        vec![CellValue::from("Ürün Adı"), CellValue::from("Kategori"), CellValue::from("Fiyat")],
        vec![CellValue::from(""), CellValue::from("panel"), CellValue::from("1,5")],
        vec![CellValue::from("B"), CellValue::from("rüzgar"), CellValue::from("2")],
    ];
    let sheet = Sheet::new("Ürünler", data);
    let mappings = auto_map_default(&sheet.headers, &product_fields());
    let preview = validate(&sheet.data, &mappings, 1, 2, &sheet.excluded_rows);
    assert_eq!(preview.errors.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hatalar.csv");
    export_errors_csv_to_path(&path, &preview.errors).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        vec!["Satır (Row)", "Sütun (Column)", "Alan (Field)", "Mesaj (Message)", "Önem (Severity)"]
    );

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][0], "2");
    assert_eq!(&records[0][2], "name");
    assert_eq!(&records[0][4], "error");
    assert_eq!(&records[1][0], "3");
    assert_eq!(&records[1][1], "Kategori");
    assert_eq!(&records[1][2], "category");
    // 允许值列表含逗号,需正确引用
    assert!(records[1][3].contains("panel, inverter"));
}

#[test]
fn test_export_to_missing_directory_fails() {
    let err = export_errors_csv_to_path("/nonexistent-dir/hatalar.csv", &[]).unwrap_err();
    assert!(matches!(err, enerjios_import::ImportError::ExportError(_)));
}
