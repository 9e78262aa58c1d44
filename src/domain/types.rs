// ==========================================
// 商品目录导入 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 分类状态 (Category Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryStatus {
    Invisible, // 不可见
    Visible,   // 可见
    Deleted,   // 已删除
}

impl CategoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryStatus::Invisible => "INVISIBLE",
            CategoryStatus::Visible => "VISIBLE",
            CategoryStatus::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INVISIBLE" => Ok(CategoryStatus::Invisible),
            "VISIBLE" => Ok(CategoryStatus::Visible),
            "DELETED" => Ok(CategoryStatus::Deleted),
            other => Err(format!("未知的分类状态: {}", other)),
        }
    }
}

// ==========================================
// 分类可见范围 (Category Visibility)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryVisibility {
    VisibleToAll,      // 所有人可见
    VisibleToLoggedIn, // 登录用户可见
    VisibleToGroups,   // 指定客户组可见
}

impl CategoryVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryVisibility::VisibleToAll => "VISIBLE_TO_ALL",
            CategoryVisibility::VisibleToLoggedIn => "VISIBLE_TO_LOGGED_IN",
            CategoryVisibility::VisibleToGroups => "VISIBLE_TO_GROUPS",
        }
    }
}

impl fmt::Display for CategoryVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VISIBLE_TO_ALL" => Ok(CategoryVisibility::VisibleToAll),
            "VISIBLE_TO_LOGGED_IN" => Ok(CategoryVisibility::VisibleToLoggedIn),
            "VISIBLE_TO_GROUPS" => Ok(CategoryVisibility::VisibleToGroups),
            other => Err(format!("未知的分类可见范围: {}", other)),
        }
    }
}

// ==========================================
// 商品媒体类型 (Product Media Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductMediaKind {
    Generic,
    Image,
    Document,
}

impl ProductMediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductMediaKind::Generic => "GENERIC",
            ProductMediaKind::Image => "IMAGE",
            ProductMediaKind::Document => "DOCUMENT",
        }
    }
}

impl fmt::Display for ProductMediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductMediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GENERIC" => Ok(ProductMediaKind::Generic),
            "IMAGE" => Ok(ProductMediaKind::Image),
            "DOCUMENT" => Ok(ProductMediaKind::Document),
            other => Err(format!("未知的媒体类型: {}", other)),
        }
    }
}

// ==========================================
// 限定方式类型 (Method Kind)
// ==========================================
// 店铺商品可限定可用的配送方式 / 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MethodKind {
    Shipping,
    Payment,
}

impl MethodKind {
    /// 数据文件中的限定字段名
    pub fn limiter_field(&self) -> &'static str {
        match self {
            MethodKind::Shipping => "limit_shipping_methods",
            MethodKind::Payment => "limit_payment_methods",
        }
    }

    pub(crate) fn method_table(&self) -> &'static str {
        match self {
            MethodKind::Shipping => "shipping_method",
            MethodKind::Payment => "payment_method",
        }
    }

    pub(crate) fn link_table(&self) -> &'static str {
        match self {
            MethodKind::Shipping => "shop_product_shipping_methods",
            MethodKind::Payment => "shop_product_payment_methods",
        }
    }

    pub(crate) fn link_column(&self) -> &'static str {
        match self {
            MethodKind::Shipping => "shipping_method_id",
            MethodKind::Payment => "payment_method_id",
        }
    }

    pub(crate) fn flag_column(&self) -> &'static str {
        self.limiter_field()
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKind::Shipping => write!(f, "SHIPPING"),
            MethodKind::Payment => write!(f, "PAYMENT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip_through_db_text() {
        for status in [
            CategoryStatus::Invisible,
            CategoryStatus::Visible,
            CategoryStatus::Deleted,
        ] {
            assert_eq!(status.as_str().parse::<CategoryStatus>().unwrap(), status);
        }
        assert!("HIDDEN".parse::<CategoryStatus>().is_err());
    }

    #[test]
    fn test_visibility_serde_matches_db_text() {
        let json = serde_json::to_string(&CategoryVisibility::VisibleToAll).unwrap();
        assert_eq!(json, "\"VISIBLE_TO_ALL\"");
    }

    #[test]
    fn test_method_kind_fields() {
        assert_eq!(MethodKind::Shipping.limiter_field(), "limit_shipping_methods");
        assert_eq!(MethodKind::Payment.link_column(), "payment_method_id");
    }
}
