// ==========================================
// 商品目录导入 - 分类导入器
// ==========================================
// 流程:
//   1. 按自然键排序逐条处理
//   2. 生成店铺范围标识符，缺少 slug 时按 name 生成
//   3. 合并记录 → 设为可见/所有人可见 → 保存 → 关联店铺
//   4. 批次结束后解析父分类，并重建分类树
// ==========================================

use crate::domain::record::RecordSet;
use crate::domain::shop::Shop;
use crate::domain::types::{CategoryStatus, CategoryVisibility};
use crate::domain::Category;
use crate::engine::category_tree::{CategoryTreeEngine, DetachReason};
use crate::importer::error::ImportResult;
use crate::importer::identifier::{
    collision_message, ensure_slugged_value, shop_scoped_identifier, IdentifierClaims,
};
use crate::importer::outcome::BatchOutcome;
use crate::importer::record_upserter::RecordUpserter;
use crate::repository::category_repo::CategoryRepository;
use rusqlite::Connection;
use tracing::{debug, info, instrument};

const ENTITY: &str = "category";

pub struct CategoryImporter<'c> {
    repo: CategoryRepository<'c>,
    shop: &'c Shop,
    upserter: RecordUpserter,
}

impl<'c> CategoryImporter<'c> {
    pub fn new(conn: &'c Connection, shop: &'c Shop, language: &str) -> Self {
        Self {
            repo: CategoryRepository::new(conn),
            shop,
            upserter: RecordUpserter::new(language),
        }
    }

    /// 导入一个分类数据文件
    #[instrument(skip_all, fields(shop_id = self.shop.id, records = records.len()))]
    pub fn import(&self, records: RecordSet) -> ImportResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        let mut entries: Vec<(String, _)> = records
            .into_iter()
            .map(|(key, record)| (key.trim().to_string(), record))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        // (分类 id, 自然键, 父分类自然键)
        let mut touched: Vec<(i64, String, Option<String>)> = Vec::with_capacity(entries.len());
        let mut claims = IdentifierClaims::new();

        for (natural_key, mut record) in entries {
            let identifier = shop_scoped_identifier(self.shop.id, &natural_key);
            if !record.is_ignored() {
                if let Some(owner) = claims.claim(&identifier, &natural_key) {
                    outcome.warn(ENTITY, &natural_key, collision_message(&identifier, &owner));
                    continue;
                }
            }
            ensure_slugged_value(&mut record, "slug", "name");

            let Some(upserted) = self.upserter.upsert::<Category, _>(&self.repo, &identifier, &record)? else {
                outcome.counts.record_ignored();
                continue;
            };

            let mut category = upserted.entity;
            category.natural_key = natural_key.clone();
            category.status = CategoryStatus::Visible;
            category.visibility = CategoryVisibility::VisibleToAll;

            let id = self.repo.save(&mut category)?;
            self.repo.add_shop(id, self.shop.id)?;
            outcome.counts.record_saved(upserted.created);
            debug!(identifier = %identifier, created = upserted.created, "分类已保存");

            touched.push((id, natural_key, category.parent_key.clone()));
        }

        self.resolve_parents(&touched, &mut outcome)?;
        self.rebuild_tree(&mut outcome)?;

        info!(
            created = outcome.counts.created,
            updated = outcome.counts.updated,
            ignored = outcome.counts.ignored,
            "分类导入完成"
        );
        Ok(outcome)
    }

    /// 在店铺范围内解析父分类自然键
    fn resolve_parents(
        &self,
        touched: &[(i64, String, Option<String>)],
        outcome: &mut BatchOutcome,
    ) -> ImportResult<()> {
        for (id, natural_key, parent_key) in touched {
            let parent_id = match parent_key {
                Some(parent_key) => {
                    let parent_identifier = shop_scoped_identifier(self.shop.id, parent_key);
                    match self.repo.find_id_by_identifier(&parent_identifier)? {
                        Some(parent_id) if parent_id != *id => Some(parent_id),
                        Some(_) => {
                            outcome.warn(ENTITY, natural_key, "分类不能以自身为父分类，按根分类处理");
                            None
                        }
                        None => {
                            outcome.warn(
                                ENTITY,
                                natural_key,
                                format!("父分类不存在: {}，按根分类处理", parent_key),
                            );
                            None
                        }
                    }
                }
                None => None,
            };
            self.repo.set_parent(*id, parent_id)?;
        }
        Ok(())
    }

    /// 重建嵌套集合编号
    fn rebuild_tree(&self, outcome: &mut BatchOutcome) -> ImportResult<()> {
        let nodes = self.repo.list_tree_nodes()?;
        let rebuild = CategoryTreeEngine::rebuild(&nodes);

        for (id, reason) in &rebuild.detached {
            let identifier = nodes
                .iter()
                .find(|node| node.id == *id)
                .map(|node| node.identifier.as_str())
                .unwrap_or_default();
            let message = match reason {
                DetachReason::Cycle => "分类父链成环，已提升为根分类",
                DetachReason::MissingParent => "父分类不存在，已提升为根分类",
            };
            outcome.warn(ENTITY, identifier, message);
            self.repo.set_parent(*id, None)?;
        }

        let updated = self.repo.update_tree_positions(&rebuild.positions)?;
        debug!(nodes = nodes.len(), updated, "分类树重建完成");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};
    use crate::importer::file_parser::parse_records;

    fn setup() -> (Connection, Shop) {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO shop (identifier, domain, name) VALUES ('default', 'test', 'Test')",
            [],
        )
        .unwrap();
        let shop = Shop {
            id: 1,
            identifier: "default".to_string(),
            domain: Some("test".to_string()),
            name: "Test".to_string(),
        };
        (conn, shop)
    }

    #[test]
    fn test_child_listed_before_parent_nests_after_rebuild() {
        let (conn, shop) = setup();
        let importer = CategoryImporter::new(&conn, &shop, "en");
        // "A Child" 排序在 "B Parent" 之前
        let records = parse_records(
            r#"
A Child:
  name: {en: Child}
  parent: B Parent
B Parent:
  name: {en: Parent}
"#,
        )
        .unwrap();

        let outcome = importer.import(records).unwrap();
        assert_eq!(outcome.counts.created, 2);
        assert!(outcome.warnings.is_empty());

        let repo = CategoryRepository::new(&conn);
        let parent = repo.find_by_identifier("1-b-parent").unwrap().unwrap();
        let child = repo.find_by_identifier("1-a-child").unwrap().unwrap();
        assert_eq!(child.parent_id, parent.id);
        assert_eq!(parent.tree.lft, 1);
        assert_eq!(parent.tree.rght, 4);
        assert_eq!(child.tree.lft, 2);
        assert_eq!(child.tree.level, 1);
        assert_eq!(child.tree.tree_id, parent.tree.tree_id);
        assert_eq!(child.status, CategoryStatus::Visible);
        assert_eq!(child.slug("en"), Some("child"));
        assert_eq!(repo.list_shop_ids(child.id.unwrap()).unwrap(), vec![1]);
    }

    #[test]
    fn test_missing_parent_warns_and_becomes_root() {
        let (conn, shop) = setup();
        let importer = CategoryImporter::new(&conn, &shop, "en");
        let records = parse_records("Toys:\n  name: {en: Toys}\n  parent: Nowhere\n").unwrap();

        let outcome = importer.import(records).unwrap();
        assert_eq!(outcome.warnings.len(), 1);

        let toys = CategoryRepository::new(&conn)
            .find_by_identifier("1-toys")
            .unwrap()
            .unwrap();
        assert_eq!(toys.parent_id, None);
        assert_eq!(toys.tree.level, 0);
    }

    #[test]
    fn test_keys_with_same_identifier_keep_first_record() {
        let (conn, shop) = setup();
        let importer = CategoryImporter::new(&conn, &shop, "en");
        // 排序后 "Dog Food" < "Dog-Food" < "dog food"
        let records = parse_records(
            "dog food:\n  name: {en: lower}\nDog-Food:\n  name: {en: dashed}\nDog Food:\n  name: {en: First}\n",
        )
        .unwrap();

        let outcome = importer.import(records).unwrap();
        assert_eq!(outcome.counts.created, 1);
        assert_eq!(outcome.warnings.len(), 2);
        for warning in &outcome.warnings {
            assert!(warning.message.contains("1-dog-food"));
            assert!(warning.message.contains("Dog Food"));
        }
        let skipped: Vec<&str> = outcome.warnings.iter().map(|w| w.identifier.as_str()).collect();
        assert_eq!(skipped, vec!["Dog-Food", "dog food"]);

        let repo = CategoryRepository::new(&conn);
        assert_eq!(repo.count().unwrap(), 1);
        let category = repo.find_by_identifier("1-dog-food").unwrap().unwrap();
        assert_eq!(category.natural_key, "Dog Food");
        assert_eq!(category.translations["en"].name.as_deref(), Some("First"));
    }

    #[test]
    fn test_reimport_updates_and_ignored_is_counted() {
        let (conn, shop) = setup();
        let importer = CategoryImporter::new(&conn, &shop, "en");
        let yaml = "Dog Food:\n  name: {en: Dog Food}\nHidden:\n  ignored: true\n  name: {en: Hidden}\n";

        let first = importer.import(parse_records(yaml).unwrap()).unwrap();
        let second = importer.import(parse_records(yaml).unwrap()).unwrap();
        assert_eq!(first.counts.created, 1);
        assert_eq!(second.counts.updated, 1);
        assert_eq!(second.counts.ignored, 1);

        let repo = CategoryRepository::new(&conn);
        assert_eq!(repo.count().unwrap(), 1);
        assert!(repo.find_by_identifier("1-hidden").unwrap().is_none());
    }
}
