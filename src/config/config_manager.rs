// ==========================================
// 商品目录导入 - 配置管理器
// ==========================================
// 职责: 导入相关配置的加载与查询
// 存储: config_kv 表 (key-value + scope)
// 说明: 借用导入所用连接，配置读取与导入处于同一事务视图
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension};

/// 默认可用语言
pub const DEFAULT_LANGUAGES: [&str; 4] = ["en", "fi", "sv", "zh-CN"];
/// 默认商品图片目录
pub const DEFAULT_PRODUCT_MEDIA_FOLDER: &str = "Products";
/// 默认品牌 logo 目录
pub const DEFAULT_MANUFACTURER_MEDIA_FOLDER: &str = "Manufacturers";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager<'c> {
    conn: &'c Connection,
}

impl<'c> ConfigManager<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 非空配置值（去除首尾空白）
    fn get_non_empty(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self
            .get_global_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager<'_> {
    fn get_default_sales_unit(&self) -> RepositoryResult<Option<String>> {
        self.get_non_empty(config_keys::DEFAULT_SALES_UNIT)
    }

    fn get_default_product_type(&self) -> RepositoryResult<Option<String>> {
        self.get_non_empty(config_keys::DEFAULT_PRODUCT_TYPE)
    }

    fn get_available_languages(&self) -> RepositoryResult<Vec<String>> {
        let defaults = || DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect();

        let Some(raw) = self.get_non_empty(config_keys::AVAILABLE_LANGUAGES)? else {
            return Ok(defaults());
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(languages) if !languages.is_empty() => Ok(languages
                .into_iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect()),
            _ => {
                tracing::warn!(
                    config_key = config_keys::AVAILABLE_LANGUAGES,
                    raw_value = %raw,
                    "可用语言配置格式错误，使用默认值"
                );
                Ok(defaults())
            }
        }
    }

    fn get_product_media_folder(&self) -> RepositoryResult<String> {
        Ok(self
            .get_non_empty(config_keys::PRODUCT_MEDIA_FOLDER)?
            .unwrap_or_else(|| DEFAULT_PRODUCT_MEDIA_FOLDER.to_string()))
    }

    fn get_manufacturer_media_folder(&self) -> RepositoryResult<String> {
        Ok(self
            .get_non_empty(config_keys::MANUFACTURER_MEDIA_FOLDER)?
            .unwrap_or_else(|| DEFAULT_MANUFACTURER_MEDIA_FOLDER.to_string()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 依赖数据（为空时取第一条）
    pub const DEFAULT_SALES_UNIT: &str = "import.default_sales_unit";
    pub const DEFAULT_PRODUCT_TYPE: &str = "import.default_product_type";

    // 语言 (JSON 数组)
    pub const AVAILABLE_LANGUAGES: &str = "import.available_languages";

    // 媒体目录
    pub const PRODUCT_MEDIA_FOLDER: &str = "import.product_media_folder";
    pub const MANUFACTURER_MEDIA_FOLDER: &str = "import.manufacturer_media_folder";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};

    fn setup() -> Connection {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_defaults_when_unset() {
        let conn = setup();
        let config = ConfigManager::new(&conn);

        assert_eq!(config.get_default_sales_unit().unwrap(), None);
        assert_eq!(config.get_product_media_folder().unwrap(), "Products");
        assert_eq!(config.get_manufacturer_media_folder().unwrap(), "Manufacturers");
        assert_eq!(config.get_available_languages().unwrap(), vec!["en", "fi", "sv", "zh-CN"]);
    }

    #[test]
    fn test_configured_values() {
        let conn = setup();
        let config = ConfigManager::new(&conn);
        config
            .set_global_config_value(config_keys::AVAILABLE_LANGUAGES, r#"["en", "de"]"#)
            .unwrap();
        config
            .set_global_config_value(config_keys::DEFAULT_SALES_UNIT, " kg ")
            .unwrap();

        assert_eq!(config.get_available_languages().unwrap(), vec!["en", "de"]);
        assert_eq!(config.get_default_sales_unit().unwrap().as_deref(), Some("kg"));
        let stored: i64 = conn
            .query_row("SELECT COUNT(*) FROM config_kv WHERE scope_id = 'global'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, 2);
    }

    #[test]
    fn test_malformed_languages_fall_back() {
        let conn = setup();
        let config = ConfigManager::new(&conn);
        config
            .set_global_config_value(config_keys::AVAILABLE_LANGUAGES, "en,fi")
            .unwrap();
        assert_eq!(config.get_available_languages().unwrap().len(), 4);
    }
}
