// ==========================================
// 商品目录导入 - 导入API
// ==========================================
// 职责: 一次完整导入（分类 → 品牌 → 商品）
// 事务: 整次导入处于同一事务；试运行无条件回滚，正式运行仅在全部成功时提交
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::shop::Shop;
use crate::i18n::{activate_locale, t, t_with_args};
use crate::importer::{
    load_record_file, BatchOutcome, CategoryImporter, EntityCounts, ImportError, ImportWarning,
    ManufacturerImporter, ProductImportContext, ProductImporter,
};
use crate::repository::ShopRepository;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// 分类数据文件名
pub const CATEGORIES_FILE: &str = "categories.yaml";
/// 品牌数据文件名
pub const MANUFACTURERS_FILE: &str = "manufacturers.yaml";
/// 商品数据文件名
pub const PRODUCTS_FILE: &str = "products.yaml";
/// 图片目录名（相对数据目录）
pub const IMAGES_DIR: &str = "images";

/// 导入选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// 目标店铺域名
    pub shop_domain: String,
    /// 数据目录（包含 YAML 文件与 images/）
    pub data_path: PathBuf,
    /// 导入语言
    pub language: String,
    /// 税类标识符（None 表示第一条税类）
    pub tax_class: Option<String>,
    /// 试运行（回滚全部变更，且不导入图片）
    pub dry_run: bool,
}

impl ImportOptions {
    pub fn new(shop_domain: &str, data_path: impl Into<PathBuf>) -> Self {
        Self {
            shop_domain: shop_domain.to_string(),
            data_path: data_path.into(),
            language: "en".to_string(),
            tax_class: None,
            dry_run: true,
        }
    }

    pub fn image_dir(&self) -> PathBuf {
        self.data_path.join(IMAGES_DIR)
    }
}

/// 导入报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,
    pub dry_run: bool,
    pub committed: bool,
    pub shop_id: i64,
    pub language: String,
    pub categories: EntityCounts,
    pub manufacturers: EntityCounts,
    pub products: EntityCounts,
    /// 品牌批次是否因 logo 缺失提前结束
    pub manufacturers_aborted: bool,
    pub warnings: Vec<ImportWarning>,
    pub elapsed_ms: i64,
}

impl ImportReport {
    /// 本地化摘要（当前消息语言）
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = [
            ("categories", &self.categories),
            ("manufacturers", &self.manufacturers),
            ("products", &self.products),
        ]
        .iter()
        .map(|(entity, counts)| {
            t_with_args(
                "import.summary",
                &[
                    ("entity", *entity),
                    ("created", counts.created.to_string().as_str()),
                    ("updated", counts.updated.to_string().as_str()),
                    ("ignored", counts.ignored.to_string().as_str()),
                ],
            )
        })
        .collect();

        if self.manufacturers_aborted {
            lines.push(t("import.logo_aborted"));
        }
        lines.push(t_with_args(
            "import.warnings",
            &[("count", self.warnings.len().to_string().as_str())],
        ));
        lines.push(if self.committed {
            t("import.committed")
        } else {
            t("import.rolled_back")
        });
        lines.push(t_with_args(
            "import.elapsed",
            &[("ms", self.elapsed_ms.to_string().as_str()), ("run_id", self.run_id.as_str())],
        ));
        lines
    }
}

/// 导入API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(db_path: &str) -> Self {
        Self {
            db_path: db_path.to_string(),
        }
    }

    /// 在数据库上创建表结构（幂等）
    pub fn init_schema(&self) -> ApiResult<()> {
        let conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(())
    }

    /// 执行一次导入
    ///
    /// # 参数
    /// - options: 导入选项
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入结果（试运行时 committed = false）
    /// - Err(ApiError): 输入无效 / 依赖缺失 / 导入失败（事务已回滚）
    pub fn run(&self, options: &ImportOptions) -> ApiResult<ImportReport> {
        let mut conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Self::run_on_connection(&mut conn, options)
    }

    /// 在已有连接上执行一次导入
    pub fn run_on_connection(conn: &mut Connection, options: &ImportOptions) -> ApiResult<ImportReport> {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();

        ensure_dir(&options.data_path)?;
        let image_dir = options.image_dir();
        ensure_dir(&image_dir)?;

        let tx = conn
            .transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let mut report = {
            let config = ConfigManager::new(&tx);
            let reference = ShopRepository::new(&tx);

            // ===== 输入校验（写入之前） =====
            let languages = config.get_available_languages()?;
            if !languages.iter().any(|l| *l == options.language) {
                return Err(ApiError::InvalidInput(t_with_args(
                    "error.invalid_language",
                    &[
                        ("language", options.language.as_str()),
                        ("available", languages.join(", ").as_str()),
                    ],
                )));
            }
            activate_locale(&options.language);

            let shop = reference
                .find_shop_by_domain(&options.shop_domain)?
                .ok_or_else(|| {
                    ApiError::NotFound(t_with_args(
                        "error.shop_not_found",
                        &[("domain", options.shop_domain.as_str())],
                    ))
                })?;
            let tax_class = reference
                .find_tax_class(options.tax_class.as_deref())?
                .ok_or_else(|| {
                    ApiError::NotFound(t_with_args(
                        "error.tax_class_not_found",
                        &[("identifier", options.tax_class.as_deref().unwrap_or("*"))],
                    ))
                })?;

            if options.dry_run {
                info!(run_id = %run_id, "{}", t("import.running_dry_run"));
            } else {
                info!(run_id = %run_id, "{}", t("import.running_updates"));
            }

            // ===== 分类 =====
            let categories = match load_optional(&options.data_path, CATEGORIES_FILE, "categories")? {
                Some(records) => CategoryImporter::new(&tx, &shop, &options.language).import(records)?,
                None => BatchOutcome::default(),
            };

            // ===== 品牌 =====
            let manufacturers = match load_optional(&options.data_path, MANUFACTURERS_FILE, "manufacturers")? {
                Some(records) => {
                    let folder = config.get_manufacturer_media_folder()?;
                    ManufacturerImporter::new(&tx, &shop, &image_dir, &folder, &options.language)
                        .import(records)?
                }
                None => BatchOutcome::default(),
            };

            // ===== 商品 =====
            let products = match load_optional(&options.data_path, PRODUCTS_FILE, "products")? {
                Some(records) => {
                    let ctx = Self::product_context(&tx, &config, shop.clone(), tax_class, options, &image_dir)?;
                    ProductImporter::new(&tx, ctx).import(records)?
                }
                None => BatchOutcome::default(),
            };

            let mut warnings = categories.warnings;
            warnings.extend(manufacturers.warnings);
            warnings.extend(products.warnings);

            ImportReport {
                run_id,
                dry_run: options.dry_run,
                committed: false,
                shop_id: shop.id,
                language: options.language.clone(),
                categories: categories.counts,
                manufacturers: manufacturers.counts,
                products: products.counts,
                manufacturers_aborted: manufacturers.aborted,
                warnings,
                elapsed_ms: 0,
            }
        };

        if options.dry_run {
            tx.rollback()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;
        } else {
            tx.commit()
                .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;
            report.committed = true;
        }

        report.elapsed_ms = started.elapsed().as_millis() as i64;
        for line in report.summary_lines() {
            info!(run_id = %report.run_id, "{}", line);
        }
        Ok(report)
    }

    /// 解析商品导入依赖（销售单位、商品类型、店铺供应商）
    fn product_context(
        conn: &Connection,
        config: &ConfigManager<'_>,
        shop: Shop,
        tax_class: crate::domain::shop::TaxClass,
        options: &ImportOptions,
        image_dir: &Path,
    ) -> ApiResult<ProductImportContext> {
        let reference = ShopRepository::new(conn);
        let missing = |what: &str| {
            ImportError::MissingDependency(t_with_args("error.missing_dependency", &[("what", what)]))
        };

        let sales_unit_id = config.get_default_sales_unit()?;
        let sales_unit = reference
            .find_sales_unit(sales_unit_id.as_deref())?
            .ok_or_else(|| missing("sales unit"))?;
        let product_type_id = config.get_default_product_type()?;
        let product_type = reference
            .find_product_type(product_type_id.as_deref())?
            .ok_or_else(|| missing("product type"))?;
        let supplier = reference
            .find_supplier_for_shop(shop.id)?
            .ok_or_else(|| missing("supplier"))?;

        Ok(ProductImportContext {
            shop,
            sales_unit,
            supplier,
            product_type,
            tax_class,
            image_dir: image_dir.to_path_buf(),
            media_folder: config.get_product_media_folder()?,
            include_images: !options.dry_run,
            language: options.language.clone(),
        })
    }
}

fn ensure_dir(path: &Path) -> ApiResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(t_with_args(
            "error.directory_not_found",
            &[("path", path.display().to_string().as_str())],
        )))
    }
}

/// 读取可选数据文件；文件不存在时返回 None
fn load_optional(
    data_path: &Path,
    file: &str,
    entity: &str,
) -> ApiResult<Option<crate::domain::RecordSet>> {
    let path = data_path.join(file);
    if !path.is_file() {
        info!("{}", t_with_args("import.file_skipped", &[("file", file)]));
        return Ok(None);
    }

    info!(
        "{}",
        t_with_args(
            "import.loading",
            &[("entity", entity), ("path", path.display().to_string().as_str())],
        )
    );
    match load_record_file(&path) {
        Ok(records) => Ok(Some(records)),
        Err(err) => {
            warn!(file = %path.display(), error = %err, "数据文件解析失败");
            Err(err.into())
        }
    }
}
