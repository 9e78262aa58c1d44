// ==========================================
// 商品目录导入 - 店铺商品 (Listing) 仓储
// ==========================================
// 职责: 管理 shop_product 及其多对多关联表
//   - shop_product_suppliers
//   - shop_product_categories
//   - shop_product_shipping_methods / shop_product_payment_methods
// ==========================================

use crate::db::decimal_column;
use crate::domain::product::ShopProduct;
use crate::domain::types::MethodKind;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};

pub struct ShopProductRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ShopProductRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn find(&self, shop_id: i64, product_id: i64) -> RepositoryResult<Option<ShopProduct>> {
        let found = self
            .conn
            .query_row(
                r#"
                SELECT
                    id, shop_id, product_id, default_price_value, primary_category_id,
                    shop_primary_image_id, limit_shipping_methods, limit_payment_methods
                FROM shop_product
                WHERE shop_id = ?1 AND product_id = ?2
                "#,
                params![shop_id, product_id],
                |row| {
                    Ok(ShopProduct {
                        id: Some(row.get(0)?),
                        shop_id: row.get(1)?,
                        product_id: row.get(2)?,
                        default_price_value: decimal_column(row, 3)?,
                        primary_category_id: row.get(4)?,
                        shop_primary_image_id: row.get(5)?,
                        limit_shipping_methods: row.get(6)?,
                        limit_payment_methods: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    /// 保存店铺商品（新建或更新）
    pub fn save(&self, shop_product: &mut ShopProduct) -> RepositoryResult<i64> {
        match shop_product.id {
            Some(id) => {
                self.conn.execute(
                    r#"
                    UPDATE shop_product SET
                        default_price_value = ?2,
                        primary_category_id = ?3,
                        shop_primary_image_id = ?4,
                        limit_shipping_methods = ?5,
                        limit_payment_methods = ?6
                    WHERE id = ?1
                    "#,
                    params![
                        id,
                        shop_product.default_price_value.to_string(),
                        shop_product.primary_category_id,
                        shop_product.shop_primary_image_id,
                        shop_product.limit_shipping_methods,
                        shop_product.limit_payment_methods,
                    ],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO shop_product (
                        shop_id, product_id, default_price_value, primary_category_id,
                        shop_primary_image_id, limit_shipping_methods, limit_payment_methods
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                    params![
                        shop_product.shop_id,
                        shop_product.product_id,
                        shop_product.default_price_value.to_string(),
                        shop_product.primary_category_id,
                        shop_product.shop_primary_image_id,
                        shop_product.limit_shipping_methods,
                        shop_product.limit_payment_methods,
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                shop_product.id = Some(id);
                Ok(id)
            }
        }
    }

    pub fn add_supplier(&self, shop_product_id: i64, supplier_id: i64) -> RepositoryResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO shop_product_suppliers (shop_product_id, supplier_id) VALUES (?1, ?2)",
            params![shop_product_id, supplier_id],
        )?;
        Ok(())
    }

    pub fn list_supplier_ids(&self, shop_product_id: i64) -> RepositoryResult<Vec<i64>> {
        self.list_ids(
            "SELECT supplier_id FROM shop_product_suppliers WHERE shop_product_id = ?1 ORDER BY supplier_id",
            shop_product_id,
        )
    }

    pub fn add_category(&self, shop_product_id: i64, category_id: i64) -> RepositoryResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO shop_product_categories (shop_product_id, category_id) VALUES (?1, ?2)",
            params![shop_product_id, category_id],
        )?;
        Ok(())
    }

    pub fn list_category_ids(&self, shop_product_id: i64) -> RepositoryResult<Vec<i64>> {
        self.list_ids(
            "SELECT category_id FROM shop_product_categories WHERE shop_product_id = ?1 ORDER BY category_id",
            shop_product_id,
        )
    }

    /// 添加限定方式（幂等）
    pub fn add_method(&self, kind: MethodKind, shop_product_id: i64, method_id: i64) -> RepositoryResult<()> {
        let sql = format!(
            "INSERT OR IGNORE INTO {} (shop_product_id, {}) VALUES (?1, ?2)",
            kind.link_table(),
            kind.link_column()
        );
        self.conn.execute(&sql, params![shop_product_id, method_id])?;
        Ok(())
    }

    /// 清空限定方式
    pub fn clear_methods(&self, kind: MethodKind, shop_product_id: i64) -> RepositoryResult<usize> {
        let sql = format!("DELETE FROM {} WHERE shop_product_id = ?1", kind.link_table());
        let removed = self.conn.execute(&sql, params![shop_product_id])?;
        Ok(removed)
    }

    pub fn list_method_ids(&self, kind: MethodKind, shop_product_id: i64) -> RepositoryResult<Vec<i64>> {
        let sql = format!(
            "SELECT {col} FROM {table} WHERE shop_product_id = ?1 ORDER BY {col}",
            col = kind.link_column(),
            table = kind.link_table()
        );
        self.list_ids(&sql, shop_product_id)
    }

    /// 读取限定开关
    pub fn method_limit_flag(&self, kind: MethodKind, shop_product_id: i64) -> RepositoryResult<bool> {
        let sql = format!("SELECT {} FROM shop_product WHERE id = ?1", kind.flag_column());
        let flag = self
            .conn
            .query_row(&sql, params![shop_product_id], |row| row.get(0))?;
        Ok(flag)
    }

    pub fn count_for_shop(&self, shop_id: i64) -> RepositoryResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM shop_product WHERE shop_id = ?1",
            params![shop_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn list_ids(&self, sql: &str, shop_product_id: i64) -> RepositoryResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![shop_product_id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};
    use rust_decimal::Decimal;

    fn setup() -> Connection {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO shop (identifier, domain, name) VALUES ('default', 'test', 'Test');
            INSERT INTO product (identifier, sku, created_on, modified_on)
            VALUES ('1-abc', 'ABC', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z');
            INSERT INTO shipping_method (identifier, name) VALUES ('dhl', 'DHL');
            INSERT INTO shipping_method (identifier, name) VALUES ('ups', 'UPS');
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_save_and_find() {
        let conn = setup();
        let repo = ShopProductRepository::new(&conn);

        assert!(repo.find(1, 1).unwrap().is_none());
        let mut listing = ShopProduct::new(1, 1, Decimal::new(1999, 2));
        repo.save(&mut listing).unwrap();

        let found = repo.find(1, 1).unwrap().unwrap();
        assert_eq!(found, listing);
        assert_eq!(found.default_price_value.to_string(), "19.99");
        assert_eq!(repo.count_for_shop(1).unwrap(), 1);
    }

    #[test]
    fn test_methods_add_and_clear() {
        let conn = setup();
        let repo = ShopProductRepository::new(&conn);
        let mut listing = ShopProduct::new(1, 1, Decimal::ZERO);
        let id = repo.save(&mut listing).unwrap();

        repo.add_method(MethodKind::Shipping, id, 1).unwrap();
        repo.add_method(MethodKind::Shipping, id, 2).unwrap();
        repo.add_method(MethodKind::Shipping, id, 2).unwrap();
        assert_eq!(repo.list_method_ids(MethodKind::Shipping, id).unwrap(), vec![1, 2]);

        assert_eq!(repo.clear_methods(MethodKind::Shipping, id).unwrap(), 2);
        assert!(repo.list_method_ids(MethodKind::Shipping, id).unwrap().is_empty());
    }
}
