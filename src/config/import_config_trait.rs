// ==========================================
// EnerjiOS 导入管道 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道所需的配置读取接口
// 实现者: ConfigManager（从 JSON 键值文件读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 文件解析 =====

    /// 获取上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 10485760（10 MiB）
    async fn get_max_file_size_bytes(&self) -> ImportResult<u64>;

    /// 上传后是否自动排除空行
    ///
    /// # 默认值
    /// - true
    async fn get_auto_exclude_empty_rows(&self) -> ImportResult<bool>;

    // ===== 列映射 =====

    /// 获取自动映射最低置信度
    ///
    /// # 返回
    /// - f64: 0.0 ~ 1.0
    ///
    /// # 默认值
    /// - 0.80
    async fn get_auto_map_threshold(&self) -> ImportResult<f64>;

    // ===== 提交 =====

    /// 获取 on_import 回调超时（秒）
    ///
    /// # 默认值
    /// - 30
    async fn get_import_timeout_secs(&self) -> ImportResult<u64>;

    // ===== 本地化 =====

    /// 获取消息语言（"tr" / "en"）
    ///
    /// # 默认值
    /// - tr
    async fn get_locale(&self) -> ImportResult<String>;
}
