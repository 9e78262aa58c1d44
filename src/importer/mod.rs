// ==========================================
// 商品目录导入 - 导入层
// ==========================================
// 职责: 数据文件 → 记录 → 实体合并 → 关系关联 → 保存
// 顺序: 分类 → 品牌 → 商品（商品引用前两者）
// ==========================================

// 模块声明
pub mod category_importer;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod identifier;
pub mod manufacturer_importer;
pub mod outcome;
pub mod product_importer;
pub mod record_upserter;

// 重导出核心类型
pub use category_importer::CategoryImporter;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{parse_decimal_string, FieldSetter, FieldSpec, TranslatedFieldSpec, Upsertable};
pub use file_parser::{load_record_file, parse_records, resolve_data_path};
pub use identifier::{ensure_slugged_value, shop_scoped_identifier, slugify, IdentifierClaims};
pub use manufacturer_importer::ManufacturerImporter;
pub use outcome::{BatchOutcome, EntityCounts, ImportWarning};
pub use product_importer::{ProductImportContext, ProductImporter};
pub use record_upserter::{RecordUpserter, Upserted};
