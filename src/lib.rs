// ==========================================
// 商品目录导入 - 核心库
// ==========================================
// 职责: 将 YAML 数据目录（分类/品牌/商品）导入店铺商品目录
// 技术栈: Rust + SQLite
// 顺序: 分类 → 品牌 → 商品，同一事务内完成
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 分类树计算
pub mod engine;

// 导入层 - YAML 数据
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 导入入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Category, FieldValue, Manufacturer, MethodKind, Product, Record, RecordSet, Shop, ShopProduct,
};

// 引擎
pub use engine::CategoryTreeEngine;

// 导入器
pub use importer::{CategoryImporter, ManufacturerImporter, ProductImporter};

// API
pub use api::{ImportApi, ImportOptions, ImportReport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "商品目录导入";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(db::CURRENT_SCHEMA_VERSION, 1);
    }
}
