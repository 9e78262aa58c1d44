// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文，用于操作员提示信息
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 消息回退语言
pub const FALLBACK_LOCALE: &str = "en";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 是否存在该语言的消息文件
pub fn has_locale(locale: &str) -> bool {
    rust_i18n::available_locales!().iter().any(|l| *l == locale)
}

/// 按导入语言切换消息语言
///
/// 导入语言没有对应消息文件时（例如 "fi"），消息使用回退语言。
///
/// # 返回
/// - 实际生效的消息语言
pub fn activate_locale(language: &str) -> String {
    let locale = if has_locale(language) {
        language
    } else {
        FALLBACK_LOCALE
    };
    set_locale(locale);
    locale.to_string()
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use catalog_import::i18n::t;
/// let msg = t("import.running_updates");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use catalog_import::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/products.yaml")]);
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
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    pub(crate) static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");

        set_locale("en");
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_activate_locale_falls_back() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        assert_eq!(activate_locale("zh-CN"), "zh-CN");
        assert_eq!(activate_locale("fi"), "en");
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(t("import.running_dry_run"), "RUNNING AS DRY-RUN");

        set_locale("zh-CN");
        assert_eq!(t("import.committed"), "导入已提交");

        set_locale("en");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/products.yaml")]);
        assert!(msg.contains("/tmp/products.yaml"));
        assert!(msg.contains("文件不存在"));

        set_locale("en");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/products.yaml")]);
        assert!(msg.contains("File not found"));
    }
}
