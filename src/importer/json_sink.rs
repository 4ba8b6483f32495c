// ==========================================
// EnerjiOS 导入管道 - JSON 文件提交端
// ==========================================
// 职责: 将已校验记录写为 JSON 数组（命令行使用）
// ==========================================

use crate::domain::preview::ImportRecord;
use crate::importer::import_pipeline_trait::ImportSink;
use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl ImportSink for JsonFileSink {
    async fn on_import(&self, rows: Vec<ImportRecord>) -> anyhow::Result<()> {
        let body = serde_json::to_vec_pretty(&rows).context("kayıtlar JSON'a dönüştürülemedi")?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("{} yazılamadı", self.path.display()))?;
        info!(path = %self.path.display(), rows = rows.len(), "记录已写入");
        Ok(())
    }
}
