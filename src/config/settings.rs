// ==========================================
// EnerjiOS 导入管道 - 会话参数快照
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::importer::auto_mapper::DEFAULT_AUTO_MAP_THRESHOLD;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::DEFAULT_MAX_FILE_SIZE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 编排器使用的参数（会话开始时从配置读取一次）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub max_file_size_bytes: u64,
    pub auto_map_threshold: f64,
    pub import_timeout: Duration,
    pub auto_exclude_empty_rows: bool,
    pub locale: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            auto_map_threshold: DEFAULT_AUTO_MAP_THRESHOLD,
            import_timeout: Duration::from_secs(30),
            auto_exclude_empty_rows: true,
            locale: "tr".to_string(),
        }
    }
}

impl ImportSettings {
    /// 从配置读取器加载
    pub async fn load<C: ImportConfigReader + ?Sized>(reader: &C) -> ImportResult<Self> {
        Ok(Self {
            max_file_size_bytes: reader.get_max_file_size_bytes().await?,
            auto_map_threshold: reader.get_auto_map_threshold().await?,
            import_timeout: Duration::from_secs(reader.get_import_timeout_secs().await?),
            auto_exclude_empty_rows: reader.get_auto_exclude_empty_rows().await?,
            locale: reader.get_locale().await?,
        })
    }

    pub fn with_import_timeout(mut self, timeout: Duration) -> Self {
        self.import_timeout = timeout;
        self
    }
}
