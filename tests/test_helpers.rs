// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、参考数据、夹具数据目录
// ==========================================
#![allow(dead_code)]

use catalog_import::api::{ImportApi, ImportOptions, ImportReport};
use catalog_import::db::{init_schema, open_sqlite_connection};
use catalog_import::logging;
use rusqlite::Connection;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// 测试店铺域名
pub const TEST_SHOP_DOMAIN: &str = "test";

/// 创建临时测试数据库，初始化 schema 并写入参考数据
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    seed_reference_data(&conn)?;

    Ok((temp_file, db_path))
}

/// 写入参考数据（店铺、税类、销售单位、商品类型、供应商、配送/支付方式）
pub fn seed_reference_data(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute_batch(
        r#"
        INSERT INTO shop (identifier, domain, name) VALUES ('default', 'test', 'Test Shop');
        INSERT INTO shop (identifier, domain, name) VALUES ('outlet', 'outlet.test', 'Outlet');
        INSERT INTO tax_class (identifier, name) VALUES ('default', 'Default');
        INSERT INTO tax_class (identifier, name) VALUES ('reduced', 'Reduced');
        INSERT INTO sales_unit (identifier, name, symbol, decimals) VALUES ('pcs', 'Pieces', 'pcs', 0);
        INSERT INTO product_type (identifier, name) VALUES ('default', 'Standard');
        INSERT INTO supplier (identifier, name) VALUES ('main', 'Main Supplier');
        INSERT INTO supplier_shops (supplier_id, shop_id) VALUES (1, 1);
        INSERT INTO shipping_method (identifier, name) VALUES ('posti', 'Posti');
        INSERT INTO shipping_method (identifier, name) VALUES ('dhl', 'DHL');
        INSERT INTO payment_method (identifier, name) VALUES ('invoice', 'Invoice');
        INSERT INTO payment_method (identifier, name) VALUES ('card', 'Card');
        "#,
    )?;
    Ok(())
}

/// 仓库内置的夹具数据目录
pub fn fixture_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data")
}

/// 复制夹具数据目录到临时目录（用于修改数据文件的测试）
pub fn copy_fixture_data() -> Result<TempDir, Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    copy_dir(&fixture_data_dir(), temp_dir.path())?;
    Ok(temp_dir)
}

fn copy_dir(from: &Path, to: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// 导入选项（默认语言 en、默认税类）
pub fn import_options(data_path: &Path, dry_run: bool) -> ImportOptions {
    ImportOptions {
        shop_domain: TEST_SHOP_DOMAIN.to_string(),
        data_path: data_path.to_path_buf(),
        language: "en".to_string(),
        tax_class: None,
        dry_run,
    }
}

/// 执行一次导入
pub fn run_import(db_path: &str, data_path: &Path, dry_run: bool) -> ImportReport {
    ImportApi::new(db_path)
        .run(&import_options(data_path, dry_run))
        .expect("导入失败")
}

/// 打开测试数据库连接
pub fn open(db_path: &str) -> Connection {
    open_sqlite_connection(db_path).expect("打开测试数据库失败")
}

/// 统计表行数
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .expect("统计行数失败")
}
