// ==========================================
// 商品目录导入 - 商品仓储
// ==========================================
// 职责: 管理 product / product_translation 表
// 说明: 十进制字段以 TEXT 存储，避免浮点误差
// ==========================================

use crate::db::decimal_column;
use crate::domain::product::{Product, ProductTranslation};
use crate::repository::entity_loader::EntityLoader;
use crate::repository::error::RepositoryResult;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::BTreeMap;

pub struct ProductRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ProductRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn find_by_identifier(&self, identifier: &str) -> RepositoryResult<Option<Product>> {
        let found = self
            .conn
            .query_row(
                r#"
                SELECT
                    id, identifier, sku, gtin, barcode,
                    width, height, depth, net_weight, gross_weight,
                    type_id, tax_class_id, sales_unit_id, manufacturer_id,
                    category_id, primary_image_id
                FROM product
                WHERE identifier = ?1
                "#,
                params![identifier],
                map_product,
            )
            .optional()?;

        match found {
            Some(mut product) => {
                if let Some(id) = product.id {
                    product.translations = self.load_translations(id)?;
                }
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    fn load_translations(&self, product_id: i64) -> RepositoryResult<BTreeMap<String, ProductTranslation>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT language_code, name, description, short_description, slug
            FROM product_translation
            WHERE product_id = ?1
            "#,
        )?;
        let rows = stmt
            .query_map(params![product_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    ProductTranslation {
                        name: row.get(1)?,
                        description: row.get(2)?,
                        short_description: row.get(3)?,
                        slug: row.get(4)?,
                    },
                ))
            })?
            .collect::<SqliteResult<BTreeMap<_, _>>>()?;
        Ok(rows)
    }

    /// 保存商品（新建或更新），并写入多语言字段
    pub fn save(&self, product: &mut Product) -> RepositoryResult<i64> {
        let now = Utc::now().to_rfc3339();
        let id = match product.id {
            Some(id) => {
                self.conn.execute(
                    r#"
                    UPDATE product SET
                        sku = ?2,
                        gtin = ?3,
                        barcode = ?4,
                        width = ?5,
                        height = ?6,
                        depth = ?7,
                        net_weight = ?8,
                        gross_weight = ?9,
                        type_id = ?10,
                        tax_class_id = ?11,
                        sales_unit_id = ?12,
                        manufacturer_id = ?13,
                        category_id = ?14,
                        primary_image_id = ?15,
                        modified_on = ?16
                    WHERE id = ?1
                    "#,
                    params![
                        id,
                        product.sku,
                        product.gtin,
                        product.barcode,
                        product.width.to_string(),
                        product.height.to_string(),
                        product.depth.to_string(),
                        product.net_weight.to_string(),
                        product.gross_weight.to_string(),
                        product.type_id,
                        product.tax_class_id,
                        product.sales_unit_id,
                        product.manufacturer_id,
                        product.category_id,
                        product.primary_image_id,
                        now,
                    ],
                )?;
                id
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO product (
                        identifier, sku, gtin, barcode,
                        width, height, depth, net_weight, gross_weight,
                        type_id, tax_class_id, sales_unit_id, manufacturer_id,
                        category_id, primary_image_id, created_on, modified_on
                    ) VALUES (
                        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16
                    )
                    "#,
                    params![
                        product.identifier,
                        product.sku,
                        product.gtin,
                        product.barcode,
                        product.width.to_string(),
                        product.height.to_string(),
                        product.depth.to_string(),
                        product.net_weight.to_string(),
                        product.gross_weight.to_string(),
                        product.type_id,
                        product.tax_class_id,
                        product.sales_unit_id,
                        product.manufacturer_id,
                        product.category_id,
                        product.primary_image_id,
                        now,
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                product.id = Some(id);
                id
            }
        };

        let mut stmt = self.conn.prepare(
            r#"
            INSERT INTO product_translation (
                product_id, language_code, name, description, short_description, slug
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(product_id, language_code) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                short_description = excluded.short_description,
                slug = excluded.slug
            "#,
        )?;
        for (language, translation) in &product.translations {
            stmt.execute(params![
                id,
                language,
                translation.name,
                translation.description,
                translation.short_description,
                translation.slug,
            ])?;
        }

        Ok(id)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM product", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl EntityLoader<Product> for ProductRepository<'_> {
    fn load_by_identifier(&self, identifier: &str) -> RepositoryResult<Option<Product>> {
        self.find_by_identifier(identifier)
    }
}

fn map_product(row: &Row<'_>) -> SqliteResult<Product> {
    Ok(Product {
        id: Some(row.get(0)?),
        identifier: row.get(1)?,
        sku: row.get(2)?,
        gtin: row.get(3)?,
        barcode: row.get(4)?,
        width: decimal_column(row, 5)?,
        height: decimal_column(row, 6)?,
        depth: decimal_column(row, 7)?,
        net_weight: decimal_column(row, 8)?,
        gross_weight: decimal_column(row, 9)?,
        type_id: row.get(10)?,
        tax_class_id: row.get(11)?,
        sales_unit_id: row.get(12)?,
        manufacturer_id: row.get(13)?,
        category_id: row.get(14)?,
        primary_image_id: row.get(15)?,
        translations: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_save_and_find_keeps_decimals_exact() {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        let repo = ProductRepository::new(&conn);

        let mut product = Product::new("1-sku1");
        product.sku = "SKU1".to_string();
        product.net_weight = Decimal::from_str("0.125").unwrap();
        product
            .translations
            .entry("en".to_string())
            .or_default()
            .name = Some("Bone".to_string());
        repo.save(&mut product).unwrap();

        let found = repo.find_by_identifier("1-sku1").unwrap().unwrap();
        assert_eq!(found, product);
        assert_eq!(found.net_weight.to_string(), "0.125");

        product.gtin = Some("123".to_string());
        repo.save(&mut product).unwrap();
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(
            repo.find_by_identifier("1-sku1").unwrap().unwrap().gtin.as_deref(),
            Some("123")
        );
    }
}
