// ==========================================
// 商品目录导入 - 媒体仓储
// ==========================================
// 职责: 管理 media_file / product_media / product_media_shops 表
// 约束: media_file 按内容 SHA-1 去重，重复导入同一文件不产生新记录
// ==========================================

use crate::domain::media::{MediaFile, ProductMedia};
use crate::domain::types::ProductMediaKind;
use crate::repository::error::{enum_column_error, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha1::{Digest, Sha1};

/// 计算内容摘要（小写十六进制）
pub fn content_sha1(data: &[u8]) -> String {
    format!("{:x}", Sha1::digest(data))
}

pub struct MediaRepository<'c> {
    conn: &'c Connection,
}

impl<'c> MediaRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn find_file_by_sha1(&self, sha1: &str) -> RepositoryResult<Option<MediaFile>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, folder, original_filename, sha1, size FROM media_file WHERE sha1 = ?1",
                params![sha1],
                |row| {
                    Ok(MediaFile {
                        id: row.get(0)?,
                        folder: row.get(1)?,
                        original_filename: row.get(2)?,
                        sha1: row.get(3)?,
                        size: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    /// 按内容存储文件
    ///
    /// # 返回
    /// - (MediaFile, true): 新写入
    /// - (MediaFile, false): 相同内容已存在，复用
    pub fn store_file(
        &self,
        folder: &str,
        original_filename: &str,
        data: &[u8],
    ) -> RepositoryResult<(MediaFile, bool)> {
        let sha1 = content_sha1(data);
        if let Some(existing) = self.find_file_by_sha1(&sha1)? {
            return Ok((existing, false));
        }

        let size = data.len() as i64;
        self.conn.execute(
            r#"
            INSERT INTO media_file (folder, original_filename, sha1, size, data, uploaded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![folder, original_filename, sha1, size, data, Utc::now().to_rfc3339()],
        )?;

        Ok((
            MediaFile {
                id: self.conn.last_insert_rowid(),
                folder: folder.to_string(),
                original_filename: original_filename.to_string(),
                sha1,
                size,
            },
            true,
        ))
    }

    /// 查找或创建商品媒体
    pub fn get_or_create_product_media(
        &self,
        product_id: i64,
        file_id: i64,
        kind: ProductMediaKind,
    ) -> RepositoryResult<ProductMedia> {
        self.conn.execute(
            "INSERT OR IGNORE INTO product_media (product_id, file_id, kind) VALUES (?1, ?2, ?3)",
            params![product_id, file_id, kind.as_str()],
        )?;

        let media = self.conn.query_row(
            r#"
            SELECT id, product_id, file_id, kind
            FROM product_media
            WHERE product_id = ?1 AND file_id = ?2 AND kind = ?3
            "#,
            params![product_id, file_id, kind.as_str()],
            |row| {
                let kind: String = row.get(3)?;
                Ok(ProductMedia {
                    id: row.get(0)?,
                    product_id: row.get(1)?,
                    file_id: row.get(2)?,
                    kind: kind
                        .parse::<ProductMediaKind>()
                        .map_err(|e| enum_column_error(3, e))?,
                })
            },
        )?;
        Ok(media)
    }

    /// 关联商品媒体与店铺（幂等）
    pub fn add_product_media_shop(&self, product_media_id: i64, shop_id: i64) -> RepositoryResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO product_media_shops (product_media_id, shop_id) VALUES (?1, ?2)",
            params![product_media_id, shop_id],
        )?;
        Ok(())
    }

    pub fn count_files(&self) -> RepositoryResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM media_file", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 统计关联到店铺的商品媒体数量
    pub fn count_product_media_for_shop(&self, shop_id: i64) -> RepositoryResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM product_media_shops WHERE shop_id = ?1",
            params![shop_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
