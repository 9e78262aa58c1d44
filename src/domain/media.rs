// ==========================================
// 商品目录导入 - 媒体文件领域模型
// ==========================================
// 对齐: media_file / product_media 表
// 说明: media_file 按内容 SHA-1 去重
// ==========================================

use crate::domain::types::ProductMediaKind;
use serde::{Deserialize, Serialize};

/// 已存储的二进制文件（不含数据本体）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: i64,
    pub folder: String,
    pub original_filename: String,
    pub sha1: String,
    pub size: i64,
}

/// 商品媒体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMedia {
    pub id: i64,
    pub product_id: i64,
    pub file_id: i64,
    pub kind: ProductMediaKind,
}
