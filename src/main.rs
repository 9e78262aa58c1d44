// ==========================================
// 商品目录导入 - 命令行入口
// ==========================================
// 用法: import_yaml --shop-domain <域名> --data-path <目录> [--no-dry-run]
// 默认试运行（全部变更回滚），--no-dry-run 时正式提交
// ==========================================

use anyhow::Context;
use catalog_import::api::{ImportApi, ImportOptions};
use catalog_import::db::{default_db_path, DB_PATH_ENV};
use catalog_import::logging;
use clap::Parser;
use std::path::PathBuf;

/// 从 YAML 数据目录导入分类、品牌与商品
#[derive(Debug, Parser)]
#[command(name = "import_yaml", version, about)]
struct Cli {
    /// 目标店铺域名
    #[arg(long)]
    shop_domain: String,

    /// 数据目录（categories.yaml / manufacturers.yaml / products.yaml / images/）
    #[arg(long)]
    data_path: PathBuf,

    /// 导入语言代码
    #[arg(long, default_value = "en")]
    language: String,

    /// 税类标识符（默认第一条税类）
    #[arg(long)]
    tax_class: Option<String>,

    /// 正式运行并提交（默认试运行）
    #[arg(long)]
    no_dry_run: bool,

    /// SQLite 数据库路径
    #[arg(long, env = DB_PATH_ENV)]
    db_path: Option<String>,

    /// 导入前创建表结构
    #[arg(long)]
    init_schema: bool,

    /// 以 JSON 格式输出日志与报告
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json);

    let db_path = cli.db_path.clone().unwrap_or_else(default_db_path);
    tracing::info!(version = catalog_import::VERSION, db_path = %db_path, "{}", catalog_import::APP_NAME);

    let api = ImportApi::new(&db_path);
    if cli.init_schema {
        api.init_schema()
            .with_context(|| format!("无法初始化数据库: {}", db_path))?;
    }

    let options = ImportOptions {
        shop_domain: cli.shop_domain,
        data_path: cli.data_path,
        language: cli.language,
        tax_class: cli.tax_class,
        dry_run: !cli.no_dry_run,
    };

    let report = api.run(&options).context("导入失败")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in report.summary_lines() {
            println!("{}", line);
        }
        for warning in &report.warnings {
            println!("  [{}] {}: {}", warning.entity, warning.identifier, warning.message);
        }
    }

    Ok(())
}
