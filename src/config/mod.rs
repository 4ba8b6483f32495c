// ==========================================
// EnerjiOS 导入管道 - 配置层
// ==========================================
// 职责: 导入参数的加载与查询
// 存储: JSON 键值文件（缺省键回退默认值）
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod settings;

// 重导出核心配置管理器
pub use config_manager::{config_keys, get_default_config_path, ConfigManager};
pub use import_config_trait::ImportConfigReader;
pub use settings::ImportSettings;
