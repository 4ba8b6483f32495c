// ==========================================
// EnerjiOS 导入管道 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 单元格级问题不是错误,而是 ValidationError 记录
// ==========================================

use thiserror::Error;

/// 上传阶段的致命错误（管道停留在 upload）
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Dosya çok büyük: {size} bayt (en fazla {max} bayt)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Desteklenmeyen dosya biçimi: {0} (yalnızca .xlsx/.xlsm/.xls)")]
    UnsupportedFormat(String),

    #[error("Excel dosyası çözümlenemedi: {0}")]
    Malformed(String),

    #[error("Çalışma kitabında veri içeren sayfa yok")]
    EmptyWorkbook,

    #[error("Dosya okunamadı: {0}")]
    Io(String),
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::Io(err.to_string())
    }
}

impl From<calamine::Error> for ParseError {
    fn from(err: calamine::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 解析错误 =====
    #[error(transparent)]
    Parse(#[from] ParseError),

    // ===== 状态机错误 =====
    #[error("Geçersiz adım geçişi: {action} ({from} adımında)")]
    InvalidTransition { from: String, action: String },

    #[error("Zorunlu alanlar eşleştirilmedi: {}", .0.join(", "))]
    RequiredFieldsMissing(Vec<String>),

    #[error("İçe aktarma engellendi: {0} hata düzeltilmeli")]
    CommitBlocked(usize),

    #[error("İçe aktarılacak geçerli satır yok")]
    NothingToImport,

    #[error("İçe aktarma zaten sürüyor")]
    ImportInProgress,

    // ===== 外部回调错误 =====
    /// 回调拒绝消息原样透出
    #[error("{0}")]
    SinkRejected(String),

    #[error("İçe aktarma {0} ms içinde tamamlanmadı")]
    SinkTimeout(u64),

    // ===== 参数错误 =====
    #[error("Bilinmeyen alan: {0}")]
    UnknownField(String),

    #[error("Sayfa bulunamadı: {index} (toplam {count})")]
    SheetOutOfRange { index: usize, count: usize },

    #[error("Satır bulunamadı: {row} (toplam {rows})")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("Sütun bulunamadı: {index} (toplam {count})")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("Alan şeması okunamadı: {0}")]
    SchemaError(String),

    // ===== 配置错误 =====
    #[error("Ayar okunamadı (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("Ayar değeri hatalı (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 导出错误 =====
    #[error("Hata listesi dışa aktarılamadı: {0}")]
    ExportError(String),

    // ===== 通用错误 =====
    #[error("İç hata: {0}")]
    InternalError(String),
}

impl ImportError {
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ImportError::Parse(_))
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::Parse(ParseError::Io(err.to_string()))
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_rejection_is_verbatim() {
        let err = ImportError::SinkRejected("Sunucu 500 döndürdü".to_string());
        assert_eq!(err.to_string(), "Sunucu 500 döndürdü");
    }

    #[test]
    fn test_parse_error_wrapping() {
        let err: ImportError = ParseError::EmptyWorkbook.into();
        assert!(err.is_parse_error());
        assert!(!ImportError::NothingToImport.is_parse_error());
    }

    #[test]
    fn test_required_fields_message_lists_labels() {
        let err = ImportError::RequiredFieldsMissing(vec!["Ürün Adı".into(), "Fiyat".into()]);
        assert!(err.to_string().contains("Ürün Adı, Fiyat"));
    }
}
