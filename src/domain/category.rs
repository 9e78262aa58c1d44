// ==========================================
// 商品目录导入 - 分类领域模型
// ==========================================
// 对齐: category / category_translation / category_shops 表
// ==========================================

use crate::domain::types::{CategoryStatus, CategoryVisibility};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 分类的多语言字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTranslation {
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
}

/// 嵌套集合（nested set）树位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreePosition {
    pub tree_id: i64,
    pub lft: i64,
    pub rght: i64,
    pub level: i64,
}

// ==========================================
// Category - 商品分类
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    // ===== 主键 =====
    pub id: Option<i64>,    // 数据库主键 (新建前为 None)
    pub identifier: String, // 店铺范围标识符 "{shop_id}-{slug}"
    pub natural_key: String, // 数据文件中的原始键

    // ===== 层级 =====
    pub parent_key: Option<String>, // 父分类自然键（数据文件提供）
    pub parent_id: Option<i64>,     // 解析后的父分类主键
    pub ordering: i64,
    pub tree: TreePosition,

    // ===== 状态 =====
    pub status: CategoryStatus,
    pub visibility: CategoryVisibility,

    // ===== 多语言 =====
    pub translations: BTreeMap<String, CategoryTranslation>,
}

impl Category {
    pub fn new(identifier: &str) -> Self {
        Self {
            id: None,
            identifier: identifier.to_string(),
            natural_key: String::new(),
            parent_key: None,
            parent_id: None,
            ordering: 0,
            tree: TreePosition::default(),
            status: CategoryStatus::Invisible,
            visibility: CategoryVisibility::VisibleToAll,
            translations: BTreeMap::new(),
        }
    }

    /// 指定语言的名称
    pub fn name(&self, language: &str) -> Option<&str> {
        self.translations
            .get(language)
            .and_then(|t| t.name.as_deref())
    }

    /// 指定语言的 slug
    pub fn slug(&self, language: &str) -> Option<&str> {
        self.translations
            .get(language)
            .and_then(|t| t.slug.as_deref())
    }
}
