// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持土耳其语（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["tr", "en"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言（不支持的语言回退到 tr）
///
/// # 参数
/// - locale: 语言代码（"tr" 或 "en"）
pub fn set_locale(locale: &str) {
    if SUPPORTED_LOCALES.contains(&locale) {
        rust_i18n::set_locale(locale);
    } else {
        tracing::warn!(locale, "不支持的语言,回退到 tr");
        rust_i18n::set_locale("tr");
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use enerjios_import::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use enerjios_import::i18n::t_with_args;
/// let msg = t_with_args("validation.missing_required", &[("field", "Fiyat")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态,且 Rust 测试默认并行执行;
    // 为避免测试互相干扰,这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");

        // 不支持的语言回退
        set_locale("de");
        assert_eq!(current_locale(), "tr");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("tr");
        assert_eq!(t("common.success"), "İşlem başarılı");

        set_locale("en");
        assert_eq!(t("common.success"), "Operation successful");

        set_locale("tr");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("tr");
        let msg = t_with_args("validation.missing_required", &[("field", "Fiyat")]);
        assert_eq!(msg, "Zorunlu alan boş: Fiyat");

        set_locale("en");
        let msg = t_with_args("validation.missing_required", &[("field", "Fiyat")]);
        assert_eq!(msg, "Required field is empty: Fiyat");

        set_locale("tr");
    }
}
