// ==========================================
// 商品目录导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 仓储借用同一个连接，导入全程处于同一事务内
// ==========================================

pub mod category_repo;
pub mod entity_loader;
pub mod error;
pub mod manufacturer_repo;
pub mod media_repo;
pub mod product_repo;
pub mod shop_product_repo;
pub mod shop_repo;

// 重导出核心仓储
pub use category_repo::CategoryRepository;
pub use entity_loader::EntityLoader;
pub use error::{RepositoryError, RepositoryResult};
pub use manufacturer_repo::ManufacturerRepository;
pub use media_repo::{content_sha1, MediaRepository};
pub use product_repo::ProductRepository;
pub use shop_product_repo::ShopProductRepository;
pub use shop_repo::ShopRepository;
