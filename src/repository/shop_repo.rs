// ==========================================
// 商品目录导入 - 店铺与参考数据仓储
// ==========================================
// 职责: 读取 shop / tax_class / sales_unit / product_type / supplier /
//       shipping_method / payment_method
// 红线: 只读，导入过程不修改参考数据
// ==========================================

use crate::domain::shop::{ProductType, SalesUnit, Shop, Supplier, TaxClass};
use crate::domain::types::MethodKind;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub struct ShopRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ShopRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// 按域名查找店铺
    pub fn find_shop_by_domain(&self, domain: &str) -> RepositoryResult<Option<Shop>> {
        let shop = self
            .conn
            .query_row(
                "SELECT id, identifier, domain, name FROM shop WHERE domain = ?1 ORDER BY id LIMIT 1",
                params![domain],
                |row| {
                    Ok(Shop {
                        id: row.get(0)?,
                        identifier: row.get(1)?,
                        domain: row.get(2)?,
                        name: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(shop)
    }

    /// 查找税类
    ///
    /// # 参数
    /// - identifier: None 时返回第一个税类
    pub fn find_tax_class(&self, identifier: Option<&str>) -> RepositoryResult<Option<TaxClass>> {
        let map = map_tax_class;
        let found = match identifier {
            Some(identifier) => self
                .conn
                .query_row(
                    "SELECT id, identifier, name FROM tax_class WHERE identifier = ?1",
                    params![identifier],
                    map,
                )
                .optional()?,
            None => self
                .conn
                .query_row(
                    "SELECT id, identifier, name FROM tax_class ORDER BY id LIMIT 1",
                    [],
                    map,
                )
                .optional()?,
        };
        Ok(found)
    }

    /// 查找销售单位（identifier 为 None 时返回第一个）
    pub fn find_sales_unit(&self, identifier: Option<&str>) -> RepositoryResult<Option<SalesUnit>> {
        let map = map_sales_unit;
        let found = match identifier {
            Some(identifier) => self
                .conn
                .query_row(
                    "SELECT id, identifier, name, symbol, decimals FROM sales_unit WHERE identifier = ?1",
                    params![identifier],
                    map,
                )
                .optional()?,
            None => self
                .conn
                .query_row(
                    "SELECT id, identifier, name, symbol, decimals FROM sales_unit ORDER BY id LIMIT 1",
                    [],
                    map,
                )
                .optional()?,
        };
        Ok(found)
    }

    /// 查找商品类型（identifier 为 None 时返回第一个）
    pub fn find_product_type(&self, identifier: Option<&str>) -> RepositoryResult<Option<ProductType>> {
        let map = map_product_type;
        let found = match identifier {
            Some(identifier) => self
                .conn
                .query_row(
                    "SELECT id, identifier, name FROM product_type WHERE identifier = ?1",
                    params![identifier],
                    map,
                )
                .optional()?,
            None => self
                .conn
                .query_row(
                    "SELECT id, identifier, name FROM product_type ORDER BY id LIMIT 1",
                    [],
                    map,
                )
                .optional()?,
        };
        Ok(found)
    }

    /// 查找关联到店铺的第一个供应商
    pub fn find_supplier_for_shop(&self, shop_id: i64) -> RepositoryResult<Option<Supplier>> {
        let found = self
            .conn
            .query_row(
                r#"
                SELECT s.id, s.identifier, s.name
                FROM supplier s
                JOIN supplier_shops ss ON ss.supplier_id = s.id
                WHERE ss.shop_id = ?1
                ORDER BY s.id
                LIMIT 1
                "#,
                params![shop_id],
                |row| {
                    Ok(Supplier {
                        id: row.get(0)?,
                        identifier: row.get(1)?,
                        name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    /// 按标识符查找配送/支付方式的主键
    pub fn find_method_id(&self, kind: MethodKind, identifier: &str) -> RepositoryResult<Option<i64>> {
        let sql = format!(
            "SELECT id FROM {} WHERE identifier = ?1",
            kind.method_table()
        );
        let id = self
            .conn
            .query_row(&sql, params![identifier], |row| row.get(0))
            .optional()?;
        Ok(id)
    }
}

fn map_tax_class(row: &Row<'_>) -> rusqlite::Result<TaxClass> {
    Ok(TaxClass {
        id: row.get(0)?,
        identifier: row.get(1)?,
        name: row.get(2)?,
    })
}

fn map_sales_unit(row: &Row<'_>) -> rusqlite::Result<SalesUnit> {
    Ok(SalesUnit {
        id: row.get(0)?,
        identifier: row.get(1)?,
        name: row.get(2)?,
        symbol: row.get(3)?,
        decimals: row.get(4)?,
    })
}

fn map_product_type(row: &Row<'_>) -> rusqlite::Result<ProductType> {
    Ok(ProductType {
        id: row.get(0)?,
        identifier: row.get(1)?,
        name: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};

    fn setup() -> Connection {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO shop (identifier, domain, name) VALUES ('default', 'test', 'Test Shop');
            INSERT INTO tax_class (identifier, name) VALUES ('default', 'Default');
            INSERT INTO tax_class (identifier, name) VALUES ('reduced', 'Reduced');
            INSERT INTO supplier (identifier, name) VALUES ('other', 'Other');
            INSERT INTO supplier (identifier, name) VALUES ('main', 'Main');
            INSERT INTO supplier_shops (supplier_id, shop_id) VALUES (2, 1);
            INSERT INTO shipping_method (identifier, name) VALUES ('dhl', 'DHL');
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_find_shop_by_domain() {
        let conn = setup();
        let repo = ShopRepository::new(&conn);
        let shop = repo.find_shop_by_domain("test").unwrap().unwrap();
        assert_eq!(shop.identifier, "default");
        assert!(repo.find_shop_by_domain("nope").unwrap().is_none());
    }

    #[test]
    fn test_tax_class_default_is_first() {
        let conn = setup();
        let repo = ShopRepository::new(&conn);
        assert_eq!(repo.find_tax_class(None).unwrap().unwrap().identifier, "default");
        assert_eq!(
            repo.find_tax_class(Some("reduced")).unwrap().unwrap().identifier,
            "reduced"
        );
        assert!(repo.find_tax_class(Some("missing")).unwrap().is_none());
    }

    #[test]
    fn test_supplier_is_scoped_to_shop() {
        let conn = setup();
        let repo = ShopRepository::new(&conn);
        assert_eq!(repo.find_supplier_for_shop(1).unwrap().unwrap().identifier, "main");
        assert!(repo.find_supplier_for_shop(99).unwrap().is_none());
    }

    #[test]
    fn test_find_method_id() {
        let conn = setup();
        let repo = ShopRepository::new(&conn);
        assert_eq!(repo.find_method_id(MethodKind::Shipping, "dhl").unwrap(), Some(1));
        assert_eq!(repo.find_method_id(MethodKind::Payment, "dhl").unwrap(), None);
    }
}
