// ==========================================
// 商品目录导入 - 品牌仓储
// ==========================================
// 职责: 管理 manufacturer / manufacturer_shops 表
// ==========================================

use crate::domain::manufacturer::Manufacturer;
use crate::repository::entity_loader::EntityLoader;
use crate::repository::error::RepositoryResult;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};

pub struct ManufacturerRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ManufacturerRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn find_by_identifier(&self, identifier: &str) -> RepositoryResult<Option<Manufacturer>> {
        let found = self
            .conn
            .query_row(
                r#"
                SELECT id, identifier, natural_key, name, url, logo_id
                FROM manufacturer
                WHERE identifier = ?1
                "#,
                params![identifier],
                |row| {
                    Ok(Manufacturer {
                        id: Some(row.get(0)?),
                        identifier: row.get(1)?,
                        natural_key: row.get(2)?,
                        name: row.get(3)?,
                        url: row.get(4)?,
                        logo_id: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    pub fn find_id_by_identifier(&self, identifier: &str) -> RepositoryResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM manufacturer WHERE identifier = ?1",
                params![identifier],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// 保存品牌（新建或更新）
    pub fn save(&self, manufacturer: &mut Manufacturer) -> RepositoryResult<i64> {
        let now = Utc::now().to_rfc3339();
        match manufacturer.id {
            Some(id) => {
                self.conn.execute(
                    r#"
                    UPDATE manufacturer SET
                        natural_key = ?2,
                        name = ?3,
                        url = ?4,
                        logo_id = ?5,
                        modified_on = ?6
                    WHERE id = ?1
                    "#,
                    params![
                        id,
                        manufacturer.natural_key,
                        manufacturer.name,
                        manufacturer.url,
                        manufacturer.logo_id,
                        now,
                    ],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO manufacturer (
                        identifier, natural_key, name, url, logo_id, created_on, modified_on
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                    "#,
                    params![
                        manufacturer.identifier,
                        manufacturer.natural_key,
                        manufacturer.name,
                        manufacturer.url,
                        manufacturer.logo_id,
                        now,
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                manufacturer.id = Some(id);
                Ok(id)
            }
        }
    }

    /// 将品牌的店铺集合替换为给定列表
    pub fn set_shops(&self, manufacturer_id: i64, shop_ids: &[i64]) -> RepositoryResult<()> {
        self.conn.execute(
            "DELETE FROM manufacturer_shops WHERE manufacturer_id = ?1",
            params![manufacturer_id],
        )?;
        let mut stmt = self.conn.prepare(
            "INSERT OR IGNORE INTO manufacturer_shops (manufacturer_id, shop_id) VALUES (?1, ?2)",
        )?;
        for shop_id in shop_ids {
            stmt.execute(params![manufacturer_id, shop_id])?;
        }
        Ok(())
    }

    pub fn list_shop_ids(&self, manufacturer_id: i64) -> RepositoryResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT shop_id FROM manufacturer_shops WHERE manufacturer_id = ?1 ORDER BY shop_id",
        )?;
        let rows = stmt
            .query_map(params![manufacturer_id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM manufacturer", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl EntityLoader<Manufacturer> for ManufacturerRepository<'_> {
    fn load_by_identifier(&self, identifier: &str) -> RepositoryResult<Option<Manufacturer>> {
        self.find_by_identifier(identifier)
    }
}
