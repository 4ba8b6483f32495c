// ==========================================
// EnerjiOS 导入管道 - 管道接口 Trait
// ==========================================
// 职责: 定义解析与提交两个外部接缝（不包含实现）
// ==========================================

use crate::domain::preview::ImportRecord;
use crate::domain::workbook::Workbook;
use crate::importer::error::ParseError;
use async_trait::async_trait;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析上传的文件内容为内存工作簿
    ///
    /// # 参数
    /// - file_name: 原始文件名（用于格式判断）
    /// - bytes: 文件内容（不会被修改）
    ///
    /// # 返回
    /// - Ok(Workbook): 至少包含一个非空工作表
    /// - Err(ParseError): 超限、格式不支持、文件损坏
    fn parse(&self, file_name: &str, bytes: &[u8]) -> Result<Workbook, ParseError>;
}

// ==========================================
// ImportSink Trait
// ==========================================
// 用途: 提交阶段的外部回调（onImport）
// 实现者: JsonFileSink, 调用方自定义（网络请求等）
#[async_trait]
pub trait ImportSink: Send + Sync {
    /// 持久化已校验的记录
    ///
    /// # 返回
    /// - Ok(()): 提交成功,管道进入 complete
    /// - Err: 提交失败,错误消息原样展示给操作员,管道回到 validation
    async fn on_import(&self, rows: Vec<ImportRecord>) -> anyhow::Result<()>;
}
