// ==========================================
// 商品目录导入 - 批次结果统计
// ==========================================

use serde::{Deserialize, Serialize};
use tracing::warn;

/// 单类实体的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub created: usize,
    pub updated: usize,
    pub ignored: usize,
}

impl EntityCounts {
    pub fn record_saved(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.updated += 1;
        }
    }

    pub fn record_ignored(&mut self) {
        self.ignored += 1;
    }

    /// 已保存的实体数（新建 + 更新）
    pub fn saved(&self) -> usize {
        self.created + self.updated
    }
}

/// 导入警告（非致命问题）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportWarning {
    pub entity: String,
    pub identifier: String,
    pub message: String,
}

/// 一个数据文件的导入结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub counts: EntityCounts,
    pub warnings: Vec<ImportWarning>,
    /// 批次是否被提前终止（例如品牌 logo 文件缺失）
    pub aborted: bool,
}

impl BatchOutcome {
    /// 记录警告并输出 warn 日志
    pub fn warn(&mut self, entity: &str, identifier: &str, message: impl Into<String>) {
        let message = message.into();
        warn!(entity, identifier, "{}", message);
        self.warnings.push(ImportWarning {
            entity: entity.to_string(),
            identifier: identifier.to_string(),
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut counts = EntityCounts::default();
        counts.record_saved(true);
        counts.record_saved(false);
        counts.record_saved(false);
        counts.record_ignored();
        assert_eq!(counts.created, 1);
        assert_eq!(counts.updated, 2);
        assert_eq!(counts.saved(), 3);
        assert_eq!(counts.ignored, 1);
    }

    #[test]
    fn test_warn_collects_message() {
        let mut outcome = BatchOutcome::default();
        outcome.warn("product", "SKU1", "图片文件不存在");
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].identifier, "SKU1");
        assert!(!outcome.aborted);
    }
}
