// ==========================================
// 商品目录导入 - 按标识符加载实体的仓储接口
// ==========================================
// 用途: RecordUpserter 通过该接口读取已存在的实体
// 实现者: CategoryRepository / ManufacturerRepository / ProductRepository
// ==========================================

use crate::repository::error::RepositoryResult;

pub trait EntityLoader<E> {
    /// 按店铺范围标识符加载实体（含多语言字段）
    ///
    /// # 返回
    /// - Some(E): 实体已存在
    /// - None: 实体不存在
    fn load_by_identifier(&self, identifier: &str) -> RepositoryResult<Option<E>>;
}
