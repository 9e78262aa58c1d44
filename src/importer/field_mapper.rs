// ==========================================
// 商品目录导入 - 字段映射器
// ==========================================
// 职责: 记录字段名 → 实体属性 的白名单映射 + 类型转换
// 约束: 不在映射表中的字段一律忽略，不做动态属性写入
// ==========================================

use crate::domain::category::{Category, CategoryTranslation};
use crate::domain::manufacturer::Manufacturer;
use crate::domain::product::{Product, ProductTranslation};
use crate::domain::record::FieldValue;
use crate::importer::error::{ImportError, ImportResult};
use rust_decimal::Decimal;
use std::str::FromStr;

// ==========================================
// 映射表类型
// ==========================================

/// 标量字段写入器（按目标类型区分）
pub enum FieldSetter<E> {
    Text(fn(&mut E, String)),
    OptionalText(fn(&mut E, Option<String>)),
    Integer(fn(&mut E, i64)),
    Decimal(fn(&mut E, Decimal)),
}

/// 标量字段映射项
pub struct FieldSpec<E> {
    pub name: &'static str,
    pub setter: FieldSetter<E>,
}

impl<E> FieldSpec<E> {
    /// 将记录值转换为目标类型并写入实体
    ///
    /// # 返回
    /// - Err(String): 值无法转换为目标类型
    pub fn apply(&self, entity: &mut E, value: &FieldValue) -> Result<(), String> {
        match self.setter {
            FieldSetter::Text(set) => set(entity, coerce_text(value)?),
            FieldSetter::OptionalText(set) => set(entity, coerce_optional_text(value)?),
            FieldSetter::Integer(set) => set(entity, coerce_integer(value)?),
            FieldSetter::Decimal(set) => set(entity, coerce_decimal(value)?),
        }
        Ok(())
    }
}

/// 多语言字段映射项（写入某一语言的翻译行）
pub struct TranslatedFieldSpec<T> {
    pub name: &'static str,
    pub setter: fn(&mut T, Option<String>),
}

/// 可由扁平记录合并的实体
pub trait Upsertable: Sized {
    /// 单一语言的翻译行类型
    type Translation: Default;

    /// 实体名（日志与错误信息使用）
    const ENTITY: &'static str;

    /// 以标识符构造新实体
    fn with_identifier(identifier: &str) -> Self;

    /// 标量字段白名单
    fn scalar_fields() -> &'static [FieldSpec<Self>];

    /// 多语言字段白名单
    fn translated_fields() -> &'static [TranslatedFieldSpec<Self::Translation>];

    /// 取得（必要时创建）指定语言的翻译行；实体无多语言字段时返回 None
    fn translation_mut(&mut self, language: &str) -> Option<&mut Self::Translation>;

    fn find_scalar_field(name: &str) -> Option<&'static FieldSpec<Self>> {
        Self::scalar_fields().iter().find(|spec| spec.name == name)
    }

    fn find_translated_field(name: &str) -> Option<&'static TranslatedFieldSpec<Self::Translation>> {
        Self::translated_fields().iter().find(|spec| spec.name == name)
    }
}

// ==========================================
// Category 映射表
// ==========================================

static CATEGORY_FIELDS: [FieldSpec<Category>; 2] = [
    FieldSpec {
        name: "ordering",
        setter: FieldSetter::Integer(|c, v| c.ordering = v),
    },
    FieldSpec {
        name: "parent",
        setter: FieldSetter::OptionalText(|c, v| c.parent_key = v),
    },
];

static CATEGORY_TRANSLATED_FIELDS: [TranslatedFieldSpec<CategoryTranslation>; 3] = [
    TranslatedFieldSpec {
        name: "name",
        setter: |t, v| t.name = v,
    },
    TranslatedFieldSpec {
        name: "description",
        setter: |t, v| t.description = v,
    },
    TranslatedFieldSpec {
        name: "slug",
        setter: |t, v| t.slug = v,
    },
];

impl Upsertable for Category {
    type Translation = CategoryTranslation;
    const ENTITY: &'static str = "category";

    fn with_identifier(identifier: &str) -> Self {
        Category::new(identifier)
    }

    fn scalar_fields() -> &'static [FieldSpec<Self>] {
        &CATEGORY_FIELDS
    }

    fn translated_fields() -> &'static [TranslatedFieldSpec<CategoryTranslation>] {
        &CATEGORY_TRANSLATED_FIELDS
    }

    fn translation_mut(&mut self, language: &str) -> Option<&mut CategoryTranslation> {
        Some(self.translations.entry(language.to_string()).or_default())
    }
}

// ==========================================
// Manufacturer 映射表
// ==========================================

static MANUFACTURER_FIELDS: [FieldSpec<Manufacturer>; 2] = [
    FieldSpec {
        name: "name",
        setter: FieldSetter::Text(|m, v| m.name = v),
    },
    FieldSpec {
        name: "url",
        setter: FieldSetter::OptionalText(|m, v| m.url = v),
    },
];

impl Upsertable for Manufacturer {
    type Translation = ();
    const ENTITY: &'static str = "manufacturer";

    fn with_identifier(identifier: &str) -> Self {
        Manufacturer::new(identifier)
    }

    fn scalar_fields() -> &'static [FieldSpec<Self>] {
        &MANUFACTURER_FIELDS
    }

    fn translated_fields() -> &'static [TranslatedFieldSpec<()>] {
        &[]
    }

    fn translation_mut(&mut self, _language: &str) -> Option<&mut ()> {
        None
    }
}

// ==========================================
// Product 映射表
// ==========================================

static PRODUCT_FIELDS: [FieldSpec<Product>; 7] = [
    FieldSpec {
        name: "gtin",
        setter: FieldSetter::OptionalText(|p, v| p.gtin = v),
    },
    FieldSpec {
        name: "barcode",
        setter: FieldSetter::OptionalText(|p, v| p.barcode = v),
    },
    FieldSpec {
        name: "width",
        setter: FieldSetter::Decimal(|p, v| p.width = v),
    },
    FieldSpec {
        name: "height",
        setter: FieldSetter::Decimal(|p, v| p.height = v),
    },
    FieldSpec {
        name: "depth",
        setter: FieldSetter::Decimal(|p, v| p.depth = v),
    },
    FieldSpec {
        name: "net_weight",
        setter: FieldSetter::Decimal(|p, v| p.net_weight = v),
    },
    FieldSpec {
        name: "gross_weight",
        setter: FieldSetter::Decimal(|p, v| p.gross_weight = v),
    },
];

static PRODUCT_TRANSLATED_FIELDS: [TranslatedFieldSpec<ProductTranslation>; 4] = [
    TranslatedFieldSpec {
        name: "name",
        setter: |t, v| t.name = v,
    },
    TranslatedFieldSpec {
        name: "description",
        setter: |t, v| t.description = v,
    },
    TranslatedFieldSpec {
        name: "short_description",
        setter: |t, v| t.short_description = v,
    },
    TranslatedFieldSpec {
        name: "slug",
        setter: |t, v| t.slug = v,
    },
];

impl Upsertable for Product {
    type Translation = ProductTranslation;
    const ENTITY: &'static str = "product";

    fn with_identifier(identifier: &str) -> Self {
        Product::new(identifier)
    }

    fn scalar_fields() -> &'static [FieldSpec<Self>] {
        &PRODUCT_FIELDS
    }

    fn translated_fields() -> &'static [TranslatedFieldSpec<ProductTranslation>] {
        &PRODUCT_TRANSLATED_FIELDS
    }

    fn translation_mut(&mut self, language: &str) -> Option<&mut ProductTranslation> {
        Some(self.translations.entry(language.to_string()).or_default())
    }
}

// ==========================================
// 类型转换
// ==========================================

fn coerce_text(value: &FieldValue) -> Result<String, String> {
    value
        .scalar_text()
        .ok_or_else(|| format!("期望文本，实际为 {:?}", value))
}

fn coerce_optional_text(value: &FieldValue) -> Result<Option<String>, String> {
    let text = coerce_text(value)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

fn coerce_integer(value: &FieldValue) -> Result<i64, String> {
    match value {
        FieldValue::Integer(i) => Ok(*i),
        FieldValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
        FieldValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("无法解析为整数: {}", s)),
        other => Err(format!("期望整数，实际为 {:?}", other)),
    }
}

fn coerce_decimal(value: &FieldValue) -> Result<Decimal, String> {
    match value {
        FieldValue::Integer(i) => Ok(Decimal::from(*i)),
        FieldValue::Float(f) => parse_decimal_string(&f.to_string()).map_err(|e| e.to_string()),
        FieldValue::Text(s) => parse_decimal_string(s).map_err(|e| e.to_string()),
        other => Err(format!("期望数值，实际为 {:?}", other)),
    }
}

/// 解析十进制数字符串
///
/// 规则:
/// - 去除所有空白
/// - 只含 `,` 不含 `.` 时，`,` 视为小数点（"12,50" → 12.50）
/// - 同时含 `.` 时，`,` 视为千分位并移除（"1,234.50" → 1234.50）
/// - 支持科学计数法
pub fn parse_decimal_string(raw: &str) -> ImportResult<Decimal> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let error = || ImportError::DecimalParseError {
        value: raw.to_string(),
    };

    if compact.is_empty() {
        return Err(error());
    }

    let normalized = if compact.contains(',') && !compact.contains('.') {
        compact.replace(',', ".")
    } else {
        compact.replace(',', "")
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|_| error())
}

/// 解析价格字段（缺失时为 0.00）
pub fn parse_price(value: Option<&FieldValue>) -> ImportResult<Decimal> {
    match value {
        None | Some(FieldValue::Null) => parse_decimal_string("0.00"),
        Some(FieldValue::Integer(i)) => Ok(Decimal::from(*i)),
        Some(FieldValue::Float(f)) => parse_decimal_string(&f.to_string()),
        Some(FieldValue::Text(s)) => parse_decimal_string(s),
        Some(other) => Err(ImportError::DecimalParseError {
            value: format!("{:?}", other),
        }),
    }
}
