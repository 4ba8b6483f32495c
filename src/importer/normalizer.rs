// ==========================================
// EnerjiOS 导入管道 - 文本规范化
// ==========================================
// 职责: 表头/枚举值比较前的统一规范化
// 规则: 去变音符 + 小写 + 标点转空格 + 空白折叠
// ==========================================

use unicode_normalization::UnicodeNormalization;

/// 规范化用于比较的文本
///
/// 土耳其语无点 ı 没有分解形式,单独折叠为 i
pub fn normalize_label(s: &str) -> String {
    let folded: String = s
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .map(|c| if c == 'ı' { 'i' } else { c })
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            '_' | '-' | '.' | '/' | '(' | ')' | ':' | ',' | ';' | '\\' => ' ',
            _ => c,
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_turkish_diacritics() {
        assert_eq!(normalize_label("Ürün Adı"), "urun adi");
        assert_eq!(normalize_label("GÜÇ (W)"), "guc w");
        assert_eq!(normalize_label("İl"), "il");
        assert_eq!(normalize_label("  Stok_Kodu  "), "stok kodu");
    }
}
