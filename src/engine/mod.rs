// ==========================================
// 商品目录导入 - 引擎层
// ==========================================
// 职责: 与存储无关的纯计算规则
// ==========================================

pub mod category_tree;

// 重导出核心引擎
pub use category_tree::{CategoryTreeEngine, DetachReason, TreeNode, TreeRebuild};
