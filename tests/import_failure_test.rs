// ==========================================
// 导入异常场景测试
// ==========================================
// 覆盖: 输入校验、缺失文件、缺失引用、事务回滚
// ==========================================

use catalog_import::api::{ApiError, ImportApi};
use catalog_import::repository::{ManufacturerRepository, MediaRepository, ProductRepository};
use std::fs;

mod test_helpers;
use test_helpers::{
    copy_fixture_data, count_rows, create_test_db, fixture_data_dir, import_options, open,
    run_import,
};

#[test]
fn test_invalid_language_is_fatal() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let mut options = import_options(&fixture_data_dir(), false);
    options.language = "klingon".to_string();

    let err = ImportApi::new(&db_path).run(&options).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)), "{:?}", err);
    assert_eq!(count_rows(&open(&db_path), "category"), 0);
}

#[test]
fn test_missing_shop_or_tax_class_is_fatal() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(&db_path);

    let mut options = import_options(&fixture_data_dir(), false);
    options.shop_domain = "unknown.test".to_string();
    assert!(matches!(api.run(&options).unwrap_err(), ApiError::NotFound(_)));

    let mut options = import_options(&fixture_data_dir(), false);
    options.tax_class = Some("luxury".to_string());
    assert!(matches!(api.run(&options).unwrap_err(), ApiError::NotFound(_)));

    options.tax_class = Some("reduced".to_string());
    let report = api.run(&options).unwrap();
    assert!(report.committed);
}

#[test]
fn test_missing_directories_are_fatal() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let data = copy_fixture_data().unwrap();
    fs::remove_dir_all(data.path().join("images")).unwrap();

    let err = ImportApi::new(&db_path)
        .run(&import_options(data.path(), false))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = ImportApi::new(&db_path)
        .run(&import_options(&data.path().join("missing"), false))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_missing_logo_aborts_manufacturer_batch() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let data = copy_fixture_data().unwrap();
    fs::remove_file(data.path().join("images/pedigree.png")).unwrap();

    let report = run_import(&db_path, data.path(), false);
    assert!(report.committed);
    assert!(report.manufacturers_aborted);
    assert_eq!(report.manufacturers.saved(), 0);
    // 商品仍然导入，品牌引用仅警告
    assert_eq!(report.products.created, 3);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.entity == "manufacturer" && w.identifier == "Pedigree"));
    assert_eq!(
        report.warnings.iter().filter(|w| w.entity == "product").count(),
        2
    );

    let conn = open(&db_path);
    assert_eq!(ManufacturerRepository::new(&conn).count().unwrap(), 0);
}

#[test]
fn test_missing_product_image_only_warns() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let data = copy_fixture_data().unwrap();
    fs::remove_file(data.path().join("images/chew-bone.jpg")).unwrap();

    let report = run_import(&db_path, data.path(), false);
    assert_eq!(report.products.created, 3);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].identifier, "BONE-01");

    let conn = open(&db_path);
    let bone = ProductRepository::new(&conn)
        .find_by_identifier("1-bone-01")
        .unwrap()
        .unwrap();
    assert_eq!(bone.primary_image_id, None);
    assert_eq!(
        MediaRepository::new(&conn)
            .count_product_media_for_shop(report.shop_id)
            .unwrap(),
        2
    );
}

#[test]
fn test_unknown_shipping_method_rolls_back_whole_run() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let data = copy_fixture_data().unwrap();
    fs::write(
        data.path().join("products.yaml"),
        "SKU-1:\n  name:\n    en: Leash\n  limit_shipping_methods: [pigeon]\n",
    )
    .unwrap();

    let err = ImportApi::new(&db_path)
        .run(&import_options(data.path(), false))
        .unwrap_err();
    assert!(matches!(err, ApiError::ImportError(ref msg) if msg.contains("pigeon")), "{:?}", err);

    let conn = open(&db_path);
    for table in ["category", "manufacturer", "product", "media_file"] {
        assert_eq!(count_rows(&conn, table), 0, "表 {} 应已回滚", table);
    }
}

#[test]
fn test_invalid_yaml_is_fatal() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let data = copy_fixture_data().unwrap();
    fs::write(data.path().join("categories.yaml"), "Dog Food: [unclosed\n").unwrap();

    let err = ImportApi::new(&db_path)
        .run(&import_options(data.path(), false))
        .unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)));
}

#[test]
fn test_missing_data_files_are_skipped() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let data = copy_fixture_data().unwrap();
    fs::remove_file(data.path().join("categories.yaml")).unwrap();
    fs::remove_file(data.path().join("manufacturers.yaml")).unwrap();

    let report = run_import(&db_path, data.path(), false);
    assert_eq!(report.categories.saved(), 0);
    assert_eq!(report.manufacturers.saved(), 0);
    assert_eq!(report.products.created, 3);
    // 分类与品牌引用均缺失: 08712942000P(2 分类 + 品牌)、BONE-01(3 分类)、CATNIP-01(分类 + 品牌)
    assert_eq!(report.warnings.len(), 8);
}

#[test]
fn test_keys_equal_after_trimming_are_fatal() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let data = copy_fixture_data().unwrap();
    fs::write(
        data.path().join("categories.yaml"),
        "\"Toys\":\n  name: {en: Toys}\n\" Toys\":\n  name: {en: Other}\n",
    )
    .unwrap();

    let err = ImportApi::new(&db_path)
        .run(&import_options(data.path(), false))
        .unwrap_err();
    assert!(matches!(err, ApiError::ImportError(ref msg) if msg.contains("Toys")), "{:?}", err);
    assert_eq!(count_rows(&open(&db_path), "category"), 0);
}
