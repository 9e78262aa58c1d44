// ==========================================
// 商品目录导入 - 分类仓储
// ==========================================
// 职责: 管理 category / category_translation / category_shops 表
// 红线: Repository 不含业务逻辑（树编号由 CategoryTreeEngine 计算）
// ==========================================

use crate::domain::category::{Category, CategoryTranslation, TreePosition};
use crate::domain::types::{CategoryStatus, CategoryVisibility};
use crate::engine::category_tree::TreeNode;
use crate::repository::entity_loader::EntityLoader;
use crate::repository::error::{enum_column_error, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::BTreeMap;

pub struct CategoryRepository<'c> {
    conn: &'c Connection,
}

impl<'c> CategoryRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// 按店铺范围标识符查找
    pub fn find_by_identifier(&self, identifier: &str) -> RepositoryResult<Option<Category>> {
        let found = self
            .conn
            .query_row(
                r#"
                SELECT
                    id, identifier, natural_key, parent_key, parent_id, ordering,
                    status, visibility, tree_id, lft, rght, level
                FROM category
                WHERE identifier = ?1
                "#,
                params![identifier],
                map_category,
            )
            .optional()?;

        match found {
            Some(mut category) => {
                if let Some(id) = category.id {
                    category.translations = self.load_translations(id)?;
                }
                Ok(Some(category))
            }
            None => Ok(None),
        }
    }

    /// 按标识符查主键（用于关联解析）
    pub fn find_id_by_identifier(&self, identifier: &str) -> RepositoryResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM category WHERE identifier = ?1",
                params![identifier],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn load_translations(&self, category_id: i64) -> RepositoryResult<BTreeMap<String, CategoryTranslation>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT language_code, name, description, slug
            FROM category_translation
            WHERE category_id = ?1
            "#,
        )?;
        let rows = stmt
            .query_map(params![category_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    CategoryTranslation {
                        name: row.get(1)?,
                        description: row.get(2)?,
                        slug: row.get(3)?,
                    },
                ))
            })?
            .collect::<SqliteResult<BTreeMap<_, _>>>()?;
        Ok(rows)
    }

    /// 保存分类（新建或更新），并写入多语言字段
    ///
    /// # 返回
    /// - 分类主键（新建时同时回写 category.id）
    pub fn save(&self, category: &mut Category) -> RepositoryResult<i64> {
        let now = Utc::now().to_rfc3339();
        let id = match category.id {
            Some(id) => {
                self.conn.execute(
                    r#"
                    UPDATE category SET
                        natural_key = ?2,
                        parent_key = ?3,
                        parent_id = ?4,
                        ordering = ?5,
                        status = ?6,
                        visibility = ?7,
                        tree_id = ?8,
                        lft = ?9,
                        rght = ?10,
                        level = ?11,
                        modified_on = ?12
                    WHERE id = ?1
                    "#,
                    params![
                        id,
                        category.natural_key,
                        category.parent_key,
                        category.parent_id,
                        category.ordering,
                        category.status.as_str(),
                        category.visibility.as_str(),
                        category.tree.tree_id,
                        category.tree.lft,
                        category.tree.rght,
                        category.tree.level,
                        now,
                    ],
                )?;
                id
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO category (
                        identifier, natural_key, parent_key, parent_id, ordering,
                        status, visibility, tree_id, lft, rght, level,
                        created_on, modified_on
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
                    "#,
                    params![
                        category.identifier,
                        category.natural_key,
                        category.parent_key,
                        category.parent_id,
                        category.ordering,
                        category.status.as_str(),
                        category.visibility.as_str(),
                        category.tree.tree_id,
                        category.tree.lft,
                        category.tree.rght,
                        category.tree.level,
                        now,
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                category.id = Some(id);
                id
            }
        };

        let mut stmt = self.conn.prepare(
            r#"
            INSERT INTO category_translation (category_id, language_code, name, description, slug)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(category_id, language_code) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                slug = excluded.slug
            "#,
        )?;
        for (language, translation) in &category.translations {
            stmt.execute(params![
                id,
                language,
                translation.name,
                translation.description,
                translation.slug,
            ])?;
        }

        Ok(id)
    }

    /// 关联分类与店铺（幂等）
    pub fn add_shop(&self, category_id: i64, shop_id: i64) -> RepositoryResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO category_shops (category_id, shop_id) VALUES (?1, ?2)",
            params![category_id, shop_id],
        )?;
        Ok(())
    }

    /// 列出分类所属店铺
    pub fn list_shop_ids(&self, category_id: i64) -> RepositoryResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT shop_id FROM category_shops WHERE category_id = ?1 ORDER BY shop_id")?;
        let rows = stmt
            .query_map(params![category_id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;
        Ok(rows)
    }

    /// 设置父分类
    pub fn set_parent(&self, category_id: i64, parent_id: Option<i64>) -> RepositoryResult<()> {
        self.conn.execute(
            "UPDATE category SET parent_id = ?2 WHERE id = ?1",
            params![category_id, parent_id],
        )?;
        Ok(())
    }

    /// 读取树重建所需的全部节点
    pub fn list_tree_nodes(&self) -> RepositoryResult<Vec<TreeNode>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, parent_id, ordering, identifier FROM category ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TreeNode {
                    id: row.get(0)?,
                    parent_id: row.get(1)?,
                    ordering: row.get(2)?,
                    identifier: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 批量写入树位置
    pub fn update_tree_positions(&self, positions: &[(i64, TreePosition)]) -> RepositoryResult<usize> {
        let mut stmt = self.conn.prepare(
            "UPDATE category SET tree_id = ?2, lft = ?3, rght = ?4, level = ?5 WHERE id = ?1",
        )?;
        let mut count = 0;
        for (id, pos) in positions {
            count += stmt.execute(params![id, pos.tree_id, pos.lft, pos.rght, pos.level])?;
        }
        Ok(count)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl EntityLoader<Category> for CategoryRepository<'_> {
    fn load_by_identifier(&self, identifier: &str) -> RepositoryResult<Option<Category>> {
        self.find_by_identifier(identifier)
    }
}

fn map_category(row: &Row<'_>) -> SqliteResult<Category> {
    let status: String = row.get(6)?;
    let visibility: String = row.get(7)?;
    Ok(Category {
        id: Some(row.get(0)?),
        identifier: row.get(1)?,
        natural_key: row.get(2)?,
        parent_key: row.get(3)?,
        parent_id: row.get(4)?,
        ordering: row.get(5)?,
        status: status
            .parse::<CategoryStatus>()
            .map_err(|e| enum_column_error(6, e))?,
        visibility: visibility
            .parse::<CategoryVisibility>()
            .map_err(|e| enum_column_error(7, e))?,
        tree: TreePosition {
            tree_id: row.get(8)?,
            lft: row.get(9)?,
            rght: row.get(10)?,
            level: row.get(11)?,
        },
        translations: BTreeMap::new(),
    })
}
