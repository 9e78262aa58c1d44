// ==========================================
// 商品目录导入 - 商品领域模型
// ==========================================
// 对齐: product / product_translation / shop_product 表
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// sku 最大长度
pub const SKU_MAX_LENGTH: usize = 128;
/// gtin 最大长度
pub const GTIN_MAX_LENGTH: usize = 40;
/// 条码最大长度
pub const BARCODE_MAX_LENGTH: usize = 100;

/// 商品的多语言字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTranslation {
    pub name: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub slug: Option<String>,
}

// ==========================================
// Product - 商品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    // ===== 主键 =====
    pub id: Option<i64>,
    pub identifier: String, // 店铺范围标识符
    pub sku: String,

    // ===== 标量属性 =====
    pub gtin: Option<String>,
    pub barcode: Option<String>,
    pub width: Decimal,
    pub height: Decimal,
    pub depth: Decimal,
    pub net_weight: Decimal,
    pub gross_weight: Decimal,

    // ===== 关联 =====
    pub type_id: Option<i64>,
    pub tax_class_id: Option<i64>,
    pub sales_unit_id: Option<i64>,
    pub manufacturer_id: Option<i64>,
    pub category_id: Option<i64>,
    pub primary_image_id: Option<i64>, // product_media.id

    // ===== 多语言 =====
    pub translations: BTreeMap<String, ProductTranslation>,
}

impl Product {
    pub fn new(identifier: &str) -> Self {
        Self {
            id: None,
            identifier: identifier.to_string(),
            sku: String::new(),
            gtin: None,
            barcode: None,
            width: Decimal::ZERO,
            height: Decimal::ZERO,
            depth: Decimal::ZERO,
            net_weight: Decimal::ZERO,
            gross_weight: Decimal::ZERO,
            type_id: None,
            tax_class_id: None,
            sales_unit_id: None,
            manufacturer_id: None,
            category_id: None,
            primary_image_id: None,
            translations: BTreeMap::new(),
        }
    }

    pub fn name(&self, language: &str) -> Option<&str> {
        self.translations
            .get(language)
            .and_then(|t| t.name.as_deref())
    }

    /// 完整校验（保存前调用）
    ///
    /// # 返回
    /// - 空列表: 校验通过
    /// - 非空: 每条为一个违规描述
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.identifier.trim().is_empty() {
            problems.push("identifier 不能为空".to_string());
        }
        if self.sku.trim().is_empty() {
            problems.push("sku 不能为空".to_string());
        } else if self.sku.chars().count() > SKU_MAX_LENGTH {
            problems.push(format!("sku 长度超过 {}", SKU_MAX_LENGTH));
        }
        if let Some(gtin) = &self.gtin {
            if gtin.chars().count() > GTIN_MAX_LENGTH {
                problems.push(format!("gtin 长度超过 {}", GTIN_MAX_LENGTH));
            }
        }
        if let Some(barcode) = &self.barcode {
            if barcode.chars().count() > BARCODE_MAX_LENGTH {
                problems.push(format!("barcode 长度超过 {}", BARCODE_MAX_LENGTH));
            }
        }

        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
            ("net_weight", self.net_weight),
            ("gross_weight", self.gross_weight),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                problems.push(format!("{} 不能为负数", field));
            }
        }

        if self.type_id.is_none() {
            problems.push("商品类型未设置".to_string());
        }
        if self.tax_class_id.is_none() {
            problems.push("税类未设置".to_string());
        }

        problems
    }
}

// ==========================================
// ShopProduct - 店铺商品 (Listing)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopProduct {
    pub id: Option<i64>,
    pub shop_id: i64,
    pub product_id: i64,
    pub default_price_value: Decimal,
    pub primary_category_id: Option<i64>,
    pub shop_primary_image_id: Option<i64>,
    pub limit_shipping_methods: bool,
    pub limit_payment_methods: bool,
}

impl ShopProduct {
    pub fn new(shop_id: i64, product_id: i64, default_price_value: Decimal) -> Self {
        Self {
            id: None,
            shop_id,
            product_id,
            default_price_value,
            primary_category_id: None,
            shop_primary_image_id: None,
            limit_shipping_methods: false,
            limit_payment_methods: false,
        }
    }
}
