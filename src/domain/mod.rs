// ==========================================
// 商品目录导入 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、数据记录
// 红线: 不含数据访问逻辑,不含导入逻辑
// ==========================================

pub mod category;
pub mod manufacturer;
pub mod media;
pub mod product;
pub mod record;
pub mod shop;
pub mod types;

// 重导出核心类型
pub use category::{Category, CategoryTranslation, TreePosition};
pub use manufacturer::Manufacturer;
pub use media::{MediaFile, ProductMedia};
pub use product::{Product, ProductTranslation, ShopProduct};
pub use record::{FieldValue, Record, RecordSet};
pub use shop::{ProductType, SalesUnit, Shop, Supplier, TaxClass};
pub use types::{CategoryStatus, CategoryVisibility, MethodKind, ProductMediaKind};
