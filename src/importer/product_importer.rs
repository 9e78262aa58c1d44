// ==========================================
// 商品目录导入 - 商品导入器
// ==========================================
// 流程（每条商品记录，按文件顺序）:
//   1. 合并记录（多语言: name/description/short_description/slug），解析价格
//   2. 设置商品类型/税类/销售单位 → 完整校验 → 保存
//   3. 获取或创建店铺商品（仅新建时写入价格）
//   4. 关联店铺供应商
//   5. 配送/支付方式限定
//   6. 主图（文件缺失仅警告）
//   7. 主分类 / 附加分类（缺失仅警告）
//   8. 品牌（缺失仅警告）
//   9. 保存店铺商品与商品
// 约束: 依赖数据（店铺、销售单位、供应商、商品类型、税类）由构造参数传入
// ==========================================

use crate::domain::product::{Product, ShopProduct};
use crate::domain::record::{FieldValue, Record, RecordSet};
use crate::domain::shop::{ProductType, SalesUnit, Shop, Supplier, TaxClass};
use crate::domain::types::{MethodKind, ProductMediaKind};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::parse_price;
use crate::importer::file_parser::resolve_data_path;
use crate::importer::identifier::{
    collision_message, ensure_slugged_value, shop_scoped_identifier, IdentifierClaims,
};
use crate::importer::outcome::BatchOutcome;
use crate::importer::record_upserter::RecordUpserter;
use crate::repository::{
    CategoryRepository, ManufacturerRepository, MediaRepository, ProductRepository,
    ShopProductRepository, ShopRepository,
};
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

const ENTITY: &str = "product";

/// 由导入器自行处理、不交给通用合并器的字段
const RELATION_FIELDS: [&str; 8] = [
    "price",
    "image",
    "category_identifier",
    "additional_category_identifier",
    "additional_category_identifiers",
    "manufacturer_identifier",
    "limit_shipping_methods",
    "limit_payment_methods",
];

/// 商品导入的运行上下文（一次导入内不变）
#[derive(Debug, Clone)]
pub struct ProductImportContext {
    pub shop: Shop,
    pub sales_unit: SalesUnit,
    pub supplier: Supplier,
    pub product_type: ProductType,
    pub tax_class: TaxClass,
    pub image_dir: PathBuf,
    pub media_folder: String,
    pub include_images: bool,
    pub language: String,
}

pub struct ProductImporter<'c> {
    ctx: ProductImportContext,
    products: ProductRepository<'c>,
    listings: ShopProductRepository<'c>,
    media: MediaRepository<'c>,
    categories: CategoryRepository<'c>,
    manufacturers: ManufacturerRepository<'c>,
    reference: ShopRepository<'c>,
    upserter: RecordUpserter,
}

impl<'c> ProductImporter<'c> {
    pub fn new(conn: &'c Connection, ctx: ProductImportContext) -> Self {
        let upserter = RecordUpserter::new(&ctx.language);
        Self {
            ctx,
            products: ProductRepository::new(conn),
            listings: ShopProductRepository::new(conn),
            media: MediaRepository::new(conn),
            categories: CategoryRepository::new(conn),
            manufacturers: ManufacturerRepository::new(conn),
            reference: ShopRepository::new(conn),
            upserter,
        }
    }

    /// 导入一个商品数据文件
    #[instrument(skip_all, fields(shop_id = self.ctx.shop.id, records = records.len()))]
    pub fn import(&self, records: RecordSet) -> ImportResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        let mut claims = IdentifierClaims::new();

        for (sku, record) in records {
            let sku = sku.trim().to_string();
            if !record.is_ignored() {
                let identifier = shop_scoped_identifier(self.ctx.shop.id, &sku);
                if let Some(owner) = claims.claim(&identifier, &sku) {
                    outcome.warn(ENTITY, &sku, collision_message(&identifier, &owner));
                    continue;
                }
            }
            match self.import_product(&sku, record, &mut outcome)? {
                Some(created) => outcome.counts.record_saved(created),
                None => outcome.counts.record_ignored(),
            }
        }

        info!(
            created = outcome.counts.created,
            updated = outcome.counts.updated,
            ignored = outcome.counts.ignored,
            warnings = outcome.warnings.len(),
            "商品导入完成"
        );
        Ok(outcome)
    }

    /// 导入单个商品
    ///
    /// # 返回
    /// - Ok(Some(true)): 新建商品
    /// - Ok(Some(false)): 更新已有商品
    /// - Ok(None): 记录被标记为忽略
    fn import_product(
        &self,
        sku: &str,
        mut record: Record,
        outcome: &mut BatchOutcome,
    ) -> ImportResult<Option<bool>> {
        if record.is_ignored() {
            return Ok(None);
        }

        let mut relations: Record = RELATION_FIELDS
            .iter()
            .filter_map(|field| record.take(field).map(|value| (field.to_string(), value)))
            .collect();

        let price = parse_price(relations.get("price"))?;
        ensure_slugged_value(&mut record, "slug", "name");

        // ===== 1-2. 商品 =====
        let identifier = shop_scoped_identifier(self.ctx.shop.id, sku);
        let Some(upserted) = self.upserter.upsert::<Product, _>(&self.products, &identifier, &record)? else {
            return Ok(None);
        };
        let created = upserted.created;
        let mut product = upserted.entity;
        product.sku = sku.to_string();
        product.type_id = Some(self.ctx.product_type.id);
        product.tax_class_id = Some(self.ctx.tax_class.id);
        product.sales_unit_id = Some(self.ctx.sales_unit.id);
        self.validate(&product)?;
        let product_id = self.products.save(&mut product)?;

        // ===== 3. 店铺商品 =====
        let mut listing = self
            .listings
            .find(self.ctx.shop.id, product_id)?
            .unwrap_or_else(|| ShopProduct::new(self.ctx.shop.id, product_id, price));
        let listing_id = self.listings.save(&mut listing)?;

        // ===== 4. 供应商 =====
        self.listings.add_supplier(listing_id, self.ctx.supplier.id)?;

        // ===== 5. 方式限定 =====
        for kind in [MethodKind::Shipping, MethodKind::Payment] {
            let limited = self.apply_method_limits(kind, listing_id, relations.get(kind.limiter_field()))?;
            match kind {
                MethodKind::Shipping => listing.limit_shipping_methods = limited,
                MethodKind::Payment => listing.limit_payment_methods = limited,
            }
        }

        // ===== 6. 主图 =====
        if let Some(image) = relations.text("image") {
            if self.ctx.include_images {
                if let Some(media_id) = self.attach_image(sku, product_id, &image, outcome)? {
                    product.primary_image_id = Some(media_id);
                    listing.shop_primary_image_id = Some(media_id);
                }
            } else {
                debug!(sku, image = %image, "图片导入已关闭，跳过");
            }
        }

        // ===== 7. 分类 =====
        if let Some(key) = relations.text("category_identifier") {
            if let Some(category_id) = self.resolve_category(sku, &key, outcome)? {
                product.category_id = Some(category_id);
                listing.primary_category_id = Some(category_id);
                self.listings.add_category(listing_id, category_id)?;
            }
        }

        let mut additional: Vec<String> = relations
            .text("additional_category_identifier")
            .into_iter()
            .collect();
        if let Some(value) = relations.take("additional_category_identifiers") {
            additional.extend(value.identifier_list());
        }
        for key in additional {
            if let Some(category_id) = self.resolve_category(sku, &key, outcome)? {
                self.listings.add_category(listing_id, category_id)?;
            }
        }

        // ===== 8. 品牌 =====
        if let Some(key) = relations.text("manufacturer_identifier") {
            let manufacturer_identifier = shop_scoped_identifier(self.ctx.shop.id, &key);
            match self.manufacturers.find_id_by_identifier(&manufacturer_identifier)? {
                Some(manufacturer_id) => product.manufacturer_id = Some(manufacturer_id),
                None => outcome.warn(ENTITY, sku, format!("品牌不存在: {}", key)),
            }
        }

        // ===== 9. 保存 =====
        self.listings.save(&mut listing)?;
        self.products.save(&mut product)?;
        debug!(sku, product_id, listing_id, created, "商品已保存");

        Ok(Some(created))
    }

    fn validate(&self, product: &Product) -> ImportResult<()> {
        let problems = product.validate();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ImportError::ValidationError {
                entity: ENTITY,
                identifier: product.sku.clone(),
                message: problems.join("; "),
            })
        }
    }

    /// 应用配送/支付方式限定
    ///
    /// # 返回
    /// - true: 已开启限定并关联方式
    /// - false: 未提供（或为空），已关闭限定并清空关联
    fn apply_method_limits(
        &self,
        kind: MethodKind,
        listing_id: i64,
        value: Option<&FieldValue>,
    ) -> ImportResult<bool> {
        let identifiers = value.map(FieldValue::identifier_list).unwrap_or_default();

        if identifiers.is_empty() {
            let removed = self.listings.clear_methods(kind, listing_id)?;
            if removed > 0 {
                debug!(kind = %kind, listing_id, removed, "已清空方式限定");
            }
            return Ok(false);
        }

        for identifier in identifiers {
            let method_id = self
                .reference
                .find_method_id(kind, &identifier)?
                .ok_or_else(|| ImportError::MissingReference {
                    kind: kind.limiter_field().to_string(),
                    identifier: identifier.clone(),
                })?;
            self.listings.add_method(kind, listing_id, method_id)?;
        }
        Ok(true)
    }

    /// 存储图片并关联为商品主图
    ///
    /// # 返回
    /// - Some(product_media.id): 已关联
    /// - None: 路径无效或文件不存在（已记录警告）
    fn attach_image(
        &self,
        sku: &str,
        product_id: i64,
        image: &str,
        outcome: &mut BatchOutcome,
    ) -> ImportResult<Option<i64>> {
        let Some(path) = resolve_data_path(&self.ctx.image_dir, image) else {
            outcome.warn(ENTITY, sku, format!("图片路径无效: {}", image));
            return Ok(None);
        };
        if !path.is_file() {
            outcome.warn(ENTITY, sku, format!("图片文件不存在: {}", path.display()));
            return Ok(None);
        }

        let data = fs::read(&path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| image.to_string());
        let (file, _) = self.media.store_file(&self.ctx.media_folder, &filename, &data)?;
        let media = self
            .media
            .get_or_create_product_media(product_id, file.id, ProductMediaKind::Image)?;
        self.media.add_product_media_shop(media.id, self.ctx.shop.id)?;
        Ok(Some(media.id))
    }

    fn resolve_category(&self, sku: &str, key: &str, outcome: &mut BatchOutcome) -> ImportResult<Option<i64>> {
        let identifier = shop_scoped_identifier(self.ctx.shop.id, key);
        let found = self.categories.find_id_by_identifier(&identifier)?;
        if found.is_none() {
            outcome.warn(ENTITY, sku, format!("分类不存在: {}", key.trim()));
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};
    use crate::importer::file_parser::parse_records;
    use tempfile::TempDir;

    fn setup() -> Connection {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO shop (identifier, domain, name) VALUES ('default', 'test', 'Test');
            INSERT INTO tax_class (identifier, name) VALUES ('default', 'Default');
            INSERT INTO sales_unit (identifier, name, symbol, decimals) VALUES ('pcs', 'Pieces', 'pcs', 0);
            INSERT INTO product_type (identifier, name) VALUES ('default', 'Standard');
            INSERT INTO supplier (identifier, name) VALUES ('main', 'Main Supplier');
            INSERT INTO supplier_shops (supplier_id, shop_id) VALUES (1, 1);
            INSERT INTO shipping_method (identifier, name) VALUES ('dhl', 'DHL');
            INSERT INTO payment_method (identifier, name) VALUES ('invoice', 'Invoice');
            "#,
        )
        .unwrap();
        conn
    }

    fn context(conn: &Connection, image_dir: PathBuf) -> ProductImportContext {
        let reference = ShopRepository::new(conn);
        let shop = reference.find_shop_by_domain("test").unwrap().unwrap();
        let supplier = reference.find_supplier_for_shop(shop.id).unwrap().unwrap();
        ProductImportContext {
            shop,
            sales_unit: reference.find_sales_unit(None).unwrap().unwrap(),
            supplier,
            product_type: reference.find_product_type(None).unwrap().unwrap(),
            tax_class: reference.find_tax_class(None).unwrap().unwrap(),
            image_dir,
            media_folder: "Products".to_string(),
            include_images: true,
            language: "en".to_string(),
        }
    }

    #[test]
    fn test_price_is_seeded_only_on_creation() {
        let conn = setup();
        let images = TempDir::new().unwrap();
        let importer = ProductImporter::new(&conn, context(&conn, images.path().to_path_buf()));

        importer
            .import(parse_records("SKU1:\n  name: {en: Bone}\n  price: \"12,50\"\n").unwrap())
            .unwrap();
        let outcome = importer
            .import(parse_records("SKU1:\n  name: {en: Bone}\n  price: \"99.00\"\n").unwrap())
            .unwrap();
        assert_eq!(outcome.counts.updated, 1);

        let product = ProductRepository::new(&conn).find_by_identifier("1-sku1").unwrap().unwrap();
        assert_eq!(product.sku, "SKU1");
        assert_eq!(product.translations["en"].slug.as_deref(), Some("bone"));
        let listing = ShopProductRepository::new(&conn)
            .find(1, product.id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(listing.default_price_value.to_string(), "12.50");
    }

    #[test]
    fn test_method_limits_enable_then_clear() {
        let conn = setup();
        let images = TempDir::new().unwrap();
        let importer = ProductImporter::new(&conn, context(&conn, images.path().to_path_buf()));

        importer
            .import(parse_records("SKU1:\n  limit_shipping_methods: [dhl]\n  limit_payment_methods: invoice\n").unwrap())
            .unwrap();
        let listings = ShopProductRepository::new(&conn);
        let listing = listings.find(1, 1).unwrap().unwrap();
        assert!(listing.limit_shipping_methods);
        assert!(listing.limit_payment_methods);
        assert_eq!(listings.list_method_ids(MethodKind::Shipping, listing.id.unwrap()).unwrap(), vec![1]);

        importer.import(parse_records("SKU1:\n  limit_shipping_methods: []\n").unwrap()).unwrap();
        let listing = listings.find(1, 1).unwrap().unwrap();
        assert!(!listing.limit_shipping_methods);
        assert!(!listing.limit_payment_methods);
        assert!(listings.list_method_ids(MethodKind::Shipping, listing.id.unwrap()).unwrap().is_empty());
        assert!(!listings.method_limit_flag(MethodKind::Shipping, listing.id.unwrap()).unwrap());
    }

    #[test]
    fn test_unknown_method_is_fatal() {
        let conn = setup();
        let images = TempDir::new().unwrap();
        let importer = ProductImporter::new(&conn, context(&conn, images.path().to_path_buf()));

        let err = importer
            .import(parse_records("SKU1:\n  limit_shipping_methods: [pigeon]\n").unwrap())
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingReference { ref identifier, .. } if identifier == "pigeon"));
    }

    #[test]
    fn test_missing_image_and_category_only_warn() {
        let conn = setup();
        let images = TempDir::new().unwrap();
        let importer = ProductImporter::new(&conn, context(&conn, images.path().to_path_buf()));

        let outcome = importer
            .import(
                parse_records(
                    "SKU1:\n  image: nope.jpg\n  category_identifier: Nowhere\n  manufacturer_identifier: Nobody\n",
                )
                .unwrap(),
            )
            .unwrap();
        assert_eq!(outcome.counts.created, 1);
        assert_eq!(outcome.warnings.len(), 3);

        let product = ProductRepository::new(&conn).find_by_identifier("1-sku1").unwrap().unwrap();
        assert_eq!(product.primary_image_id, None);
        assert_eq!(product.category_id, None);
        assert_eq!(product.manufacturer_id, None);
    }

    #[test]
    fn test_image_is_stored_and_set_as_primary() {
        let conn = setup();
        let images = TempDir::new().unwrap();
        fs::write(images.path().join("bone.jpg"), b"bone-image").unwrap();
        let importer = ProductImporter::new(&conn, context(&conn, images.path().to_path_buf()));

        let yaml = "SKU1:\n  image: bone.jpg\n";
        importer.import(parse_records(yaml).unwrap()).unwrap();
        importer.import(parse_records(yaml).unwrap()).unwrap();

        let media = MediaRepository::new(&conn);
        assert_eq!(media.count_files().unwrap(), 1);
        assert_eq!(media.count_product_media_for_shop(1).unwrap(), 1);

        let product = ProductRepository::new(&conn).find_by_identifier("1-sku1").unwrap().unwrap();
        let listing = ShopProductRepository::new(&conn).find(1, 1).unwrap().unwrap();
        assert!(product.primary_image_id.is_some());
        assert_eq!(listing.shop_primary_image_id, product.primary_image_id);
    }

    #[test]
    fn test_image_outside_image_dir_only_warns() {
        let conn = setup();
        let root = TempDir::new().unwrap();
        let images = root.path().join("images");
        fs::create_dir(&images).unwrap();
        fs::write(root.path().join("secret.jpg"), b"secret").unwrap();
        let importer = ProductImporter::new(&conn, context(&conn, images));

        let absolute = root.path().join("secret.jpg");
        let yaml = format!(
            "SKU1:\n  image: ../secret.jpg\nSKU2:\n  image: \"{}\"\n",
            absolute.display()
        );
        let outcome = importer.import(parse_records(&yaml).unwrap()).unwrap();
        assert_eq!(outcome.counts.created, 2);
        assert_eq!(outcome.warnings.len(), 2);
        assert_eq!(MediaRepository::new(&conn).count_files().unwrap(), 0);

        let product = ProductRepository::new(&conn).find_by_identifier("1-sku1").unwrap().unwrap();
        assert_eq!(product.primary_image_id, None);
    }

    #[test]
    fn test_skus_with_same_identifier_keep_first_record() {
        let conn = setup();
        let images = TempDir::new().unwrap();
        let importer = ProductImporter::new(&conn, context(&conn, images.path().to_path_buf()));

        let outcome = importer
            .import(parse_records("ab-1:\n  name: {en: First}\nAB 1:\n  name: {en: Second}\n").unwrap())
            .unwrap();
        assert_eq!(outcome.counts.created, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].identifier, "AB 1");
        assert!(outcome.warnings[0].message.contains("ab-1"));

        let products = ProductRepository::new(&conn);
        assert_eq!(products.count().unwrap(), 1);
        let product = products.find_by_identifier("1-ab-1").unwrap().unwrap();
        assert_eq!(product.sku, "ab-1");
        assert_eq!(product.translations["en"].name.as_deref(), Some("First"));
    }

    #[test]
    fn test_images_disabled_skips_media() {
        let conn = setup();
        let images = TempDir::new().unwrap();
        fs::write(images.path().join("bone.jpg"), b"bone-image").unwrap();
        let mut ctx = context(&conn, images.path().to_path_buf());
        ctx.include_images = false;
        let importer = ProductImporter::new(&conn, ctx);

        let outcome = importer.import(parse_records("SKU1:\n  image: bone.jpg\n").unwrap()).unwrap();
        assert!(outcome.warnings.is_empty());
        assert_eq!(MediaRepository::new(&conn).count_files().unwrap(), 0);
    }
}
