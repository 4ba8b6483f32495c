// ==========================================
// EnerjiOS 导入管道 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: JSON 对象文件 (key-value),缺省键使用默认值
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "ENERJIOS_IMPORT_CONFIG";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl ConfigManager {
    /// 创建只含默认值的 ConfigManager
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// 从 JSON 配置文件加载
    ///
    /// # 参数
    /// - path: 配置文件路径（不存在时使用全部默认值）
    ///
    /// # 返回
    /// - Err(ConfigReadError): 文件无法读取或不是 JSON 对象
    pub fn from_path<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "配置文件不存在,使用默认配置");
            return Ok(Self::new());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        let manager = Self::from_json_str(&raw).map_err(|e| match e {
            ImportError::ConfigReadError { message, .. } => ImportError::ConfigReadError {
                key: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        info!(path = %path.display(), "配置已加载");
        Ok(manager)
    }

    /// 从 JSON 对象字符串加载（标量值统一转为字符串保存）
    pub fn from_json_str(raw: &str) -> ImportResult<Self> {
        let parsed: Value = serde_json::from_str(raw).map_err(|e| ImportError::ConfigReadError {
            key: "<json>".to_string(),
            message: e.to_string(),
        })?;
        let object = parsed.as_object().ok_or_else(|| ImportError::ConfigReadError {
            key: "<json>".to_string(),
            message: "配置根节点必须是 JSON 对象".to_string(),
        })?;

        let values = object
            .iter()
            .map(|(k, v)| {
                let s = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), s)
            })
            .collect();
        Ok(Self {
            values: Arc::new(Mutex::new(values)),
        })
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;
        Ok(values.get(key).cloned())
    }

    /// 读取配置值,带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ImportResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 覆写单个配置值（仅内存）
    pub fn set_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;
        debug!(key, value, "覆写配置");
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// 获取所有显式配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ImportResult<String> {
        let values = self
            .values
            .lock()
            .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;
        serde_json::to_string(&*values).map_err(|e| ImportError::InternalError(e.to_string()))
    }

    fn parse_value<T: std::str::FromStr>(&self, key: &str, default: &str) -> ImportResult<T>
    where
        T::Err: std::fmt::Display,
    {
        let value = self.get_config_or_default(key, default)?;
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ImportError::ConfigValueError {
                key: key.to_string(),
                value: value.clone(),
                message: e.to_string(),
            })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 默认配置文件路径
///
/// 优先级: 环境变量 ENERJIOS_IMPORT_CONFIG > {config_dir}/enerjios/import.json > ./import.json
pub fn get_default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs::config_dir()
        .map(|dir| dir.join("enerjios").join("import.json"))
        .unwrap_or_else(|| PathBuf::from("import.json"))
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_max_file_size_bytes(&self) -> ImportResult<u64> {
        self.parse_value(config_keys::MAX_FILE_SIZE_BYTES, "10485760")
    }

    async fn get_auto_exclude_empty_rows(&self) -> ImportResult<bool> {
        self.parse_value(config_keys::AUTO_EXCLUDE_EMPTY_ROWS, "true")
    }

    async fn get_auto_map_threshold(&self) -> ImportResult<f64> {
        let threshold: f64 = self.parse_value(config_keys::AUTO_MAP_THRESHOLD, "0.8")?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ImportError::ConfigValueError {
                key: config_keys::AUTO_MAP_THRESHOLD.to_string(),
                value: threshold.to_string(),
                message: "0.0 ~ 1.0 aralığında olmalı".to_string(),
            });
        }
        Ok(threshold)
    }

    async fn get_import_timeout_secs(&self) -> ImportResult<u64> {
        self.parse_value(config_keys::IMPORT_TIMEOUT_SECS, "30")
    }

    async fn get_locale(&self) -> ImportResult<String> {
        let value = self.get_config_or_default(config_keys::LOCALE, "tr")?;
        Ok(value.trim().to_lowercase())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 解析
    pub const MAX_FILE_SIZE_BYTES: &str = "max_file_size_bytes";
    pub const AUTO_EXCLUDE_EMPTY_ROWS: &str = "auto_exclude_empty_rows";

    // 映射
    pub const AUTO_MAP_THRESHOLD: &str = "auto_map_threshold";

    // 提交
    pub const IMPORT_TIMEOUT_SECS: &str = "import_timeout_secs";

    // 本地化
    pub const LOCALE: &str = "locale";
}
