// ==========================================
// EnerjiOS 导入管道 - 系统字段定义
// ==========================================
// 职责: 外部提供的目标字段 schema（管道只读）
// 说明: 管道与具体 schema 无关,内置产品字段集仅作默认值
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ==========================================
// DataType - 目标字段数据类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Text,
    Number,
    Integer,
    Boolean,
    Enum,
    Date,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Integer => "integer",
            DataType::Boolean => "boolean",
            DataType::Enum => "enum",
            DataType::Date => "date",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// FieldConstraints - 取值约束
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>, // 数值下限（含）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>, // 数值上限（含）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>, // 文本长度提示（超出仅警告）
}

// ==========================================
// SystemField - 目标字段
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub description: String,
    /// 自动映射时额外参考的表头别名
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// 参与跨行重复检测
    #[serde(default)]
    pub unique: bool,
    #[serde(default, flatten)]
    pub constraints: FieldConstraints,
}

impl SystemField {
    pub fn new(id: impl Into<String>, label: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            required: false,
            data_type,
            enum_values: Vec::new(),
            example: String::new(),
            description: String::new(),
            aliases: Vec::new(),
            unique: false,
            constraints: FieldConstraints::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_enum_values(mut self, values: &[&str]) -> Self {
        self.enum_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.constraints.min = min;
        self.constraints.max = max;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.constraints.max_length = Some(max_length);
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// 内置产品字段集（EnerjiOS 产品目录导入）
pub fn product_fields() -> Vec<SystemField> {
    vec![
        SystemField::new("name", "Ürün Adı", DataType::Text)
            .required()
            .with_aliases(&["ürün", "ad", "product name", "name"])
            .with_max_length(200)
            .with_example("Jinko Tiger Neo 580W"),
        SystemField::new("sku", "Stok Kodu", DataType::Text)
            .unique()
            .with_aliases(&["sku", "kod", "ürün kodu", "stok kodu"])
            .with_example("JKM580N-72HL4"),
        SystemField::new("brand", "Marka", DataType::Text)
            .with_aliases(&["brand", "üretici"])
            .with_example("Jinko"),
        SystemField::new("model", "Model", DataType::Text).with_example("Tiger Neo"),
        SystemField::new("category", "Kategori", DataType::Enum)
            .required()
            .with_enum_values(&["panel", "inverter", "battery", "mounting", "cable", "accessory"])
            .with_aliases(&["tür", "tip", "category"])
            .with_example("panel"),
        SystemField::new("power", "Güç (W)", DataType::Number)
            .with_range(Some(0.0), None)
            .with_aliases(&["güç", "watt", "power"])
            .with_example("580"),
        SystemField::new("price", "Fiyat", DataType::Number)
            .required()
            .with_range(Some(0.0), None)
            .with_aliases(&["birim fiyat", "price", "tutar"])
            .with_example("4.250,00"),
        SystemField::new("currency", "Para Birimi", DataType::Enum)
            .with_enum_values(&["TRY", "USD", "EUR"])
            .with_aliases(&["döviz", "currency"])
            .with_example("USD"),
        SystemField::new("stock", "Stok Adedi", DataType::Integer)
            .with_range(Some(0.0), None)
            .with_aliases(&["stok", "adet", "miktar", "stock"])
            .with_example("120"),
        SystemField::new("warranty_years", "Garanti (Yıl)", DataType::Integer)
            .with_range(Some(0.0), Some(50.0))
            .with_aliases(&["garanti", "warranty"])
            .with_example("25"),
        SystemField::new("is_active", "Aktif", DataType::Boolean)
            .with_aliases(&["durum", "active"])
            .with_example("Evet"),
        SystemField::new("valid_until", "Geçerlilik Tarihi", DataType::Date)
            .with_aliases(&["geçerlilik", "valid until"])
            .with_example("31.12.2026"),
        SystemField::new("description", "Açıklama", DataType::Text)
            .with_aliases(&["not", "description"])
            .with_max_length(2000),
    ]
}

/// 从 JSON 文件加载字段 schema（数组形式）
pub fn load_fields_from_json<P: AsRef<Path>>(path: P) -> ImportResult<Vec<SystemField>> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let fields: Vec<SystemField> = serde_json::from_str(&raw).map_err(|e| {
        ImportError::SchemaError(format!("{}: {}", path.as_ref().display(), e))
    })?;
    Ok(fields)
}
