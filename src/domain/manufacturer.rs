// ==========================================
// 商品目录导入 - 品牌（制造商）领域模型
// ==========================================
// 对齐: manufacturer / manufacturer_shops 表
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: Option<i64>,
    pub identifier: String,  // 店铺范围标识符
    pub natural_key: String, // 数据文件中的原始键
    pub name: String,
    pub url: Option<String>,
    pub logo_id: Option<i64>, // media_file.id
}

impl Manufacturer {
    pub fn new(identifier: &str) -> Self {
        Self {
            id: None,
            identifier: identifier.to_string(),
            natural_key: String::new(),
            name: String::new(),
            url: None,
            logo_id: None,
        }
    }
}
