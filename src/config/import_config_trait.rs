// ==========================================
// 商品目录导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader {
    // ===== 依赖数据 =====

    /// 获取默认销售单位标识符
    ///
    /// # 返回
    /// - Some(identifier): 指定的销售单位
    /// - None: 使用第一条销售单位
    fn get_default_sales_unit(&self) -> RepositoryResult<Option<String>>;

    /// 获取默认商品类型标识符
    ///
    /// # 返回
    /// - Some(identifier): 指定的商品类型
    /// - None: 使用第一条商品类型
    fn get_default_product_type(&self) -> RepositoryResult<Option<String>>;

    // ===== 语言 =====

    /// 获取可用语言代码列表
    ///
    /// # 默认值
    /// - ["en", "fi", "sv", "zh-CN"]
    fn get_available_languages(&self) -> RepositoryResult<Vec<String>>;

    // ===== 媒体 =====

    /// 商品图片存放目录
    ///
    /// # 默认值
    /// - "Products"
    fn get_product_media_folder(&self) -> RepositoryResult<String>;

    /// 品牌 logo 存放目录
    ///
    /// # 默认值
    /// - "Manufacturers"
    fn get_manufacturer_media_folder(&self) -> RepositoryResult<String>;
}
