// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 生成 xlsx 夹具、提供可控的 ImportSink / 配置实现
// ==========================================
#![allow(dead_code)]

use async_trait::async_trait;
use enerjios_import::config::ImportConfigReader;
use enerjios_import::{ImportRecord, ImportResult, ImportSink};
use rust_xlsxwriter::Workbook;
use std::sync::Mutex;
use std::time::Duration;

/// 按行生成 xlsx 内容
///
/// # 规则
/// - 空字符串不写入（保持为空单元格）
/// - 能解析为 f64 的值写为数值单元格,其余写为文本
pub fn xlsx_bytes(sheets: &[(&str, &[&[&str]])]) -> Vec<u8> {
    xlsx_bytes_at(sheets, 0, 0)
}

/// 同 xlsx_bytes,但从 (row_offset, col_offset) 开始写入
pub fn xlsx_bytes_at(sheets: &[(&str, &[&[&str]])], row_offset: u32, col_offset: u16) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let (r, c) = (row_offset + r as u32, col_offset + c as u16);
                match value.parse::<f64>() {
                    Ok(n) => worksheet.write_number(r, c, n).unwrap(),
                    Err(_) => worksheet.write_string(r, c, *value).unwrap(),
                };
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// 产品目录样例（第 4 行为空行,第 5 行价格无效）
pub const PRODUCT_ROWS: &[&[&str]] = &[
    &["Ürün Adı", "Stok Kodu", "Kategori", "Fiyat", "Para Birimi"],
    &["Jinko Tiger Neo", "JKM580", "panel", "4250.5", "USD"],
    &["Huawei SUN2000", "SUN2000-10K", "Inverter", "1200", "usd"],
    &["", "", "", "", ""],
    &["Pylontech", "US5000", "battery", "abc", "EUR"],
];

pub fn product_workbook() -> Vec<u8> {
    xlsx_bytes(&[("Ürünler", PRODUCT_ROWS)])
}

// ==========================================
// MockSink - 记录收到的数据,可模拟失败与延迟
// ==========================================
#[derive(Default)]
pub struct MockSink {
    pub received: Mutex<Vec<Vec<ImportRecord>>>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn last_rows(&self) -> Vec<ImportRecord> {
        self.received.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ImportSink for MockSink {
    async fn on_import(&self, rows: Vec<ImportRecord>) -> anyhow::Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.fail_with {
            return Err(anyhow::anyhow!(message.clone()));
        }
        self.received.lock().unwrap().push(rows);
        Ok(())
    }
}

// ==========================================
// MockConfig - 固定值配置
// ==========================================
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub max_file_size_bytes: u64,
    pub auto_map_threshold: f64,
    pub import_timeout_secs: u64,
    pub auto_exclude_empty_rows: bool,
    pub locale: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 1024 * 1024,
            auto_map_threshold: 0.85,
            import_timeout_secs: 5,
            auto_exclude_empty_rows: false,
            locale: "en".to_string(),
        }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
    async fn get_max_file_size_bytes(&self) -> ImportResult<u64> {
        Ok(self.max_file_size_bytes)
    }

    async fn get_auto_exclude_empty_rows(&self) -> ImportResult<bool> {
        Ok(self.auto_exclude_empty_rows)
    }

    async fn get_auto_map_threshold(&self) -> ImportResult<f64> {
        Ok(self.auto_map_threshold)
    }

    async fn get_import_timeout_secs(&self) -> ImportResult<u64> {
        Ok(self.import_timeout_secs)
    }

    async fn get_locale(&self) -> ImportResult<String> {
        Ok(self.locale.clone())
    }
}
