// ==========================================
// 商品目录导入 - 品牌导入器
// ==========================================
// 流程:
//   1. 按自然键排序逐条处理
//   2. 取出 logo 字段（相对图片目录的路径）
//   3. logo 文件存在 → 按内容存储并关联；不存在或路径越出图片目录 → 警告并终止本批次剩余品牌
//   4. 合并记录 → 保存 → 店铺集合设为当前店铺
// 说明: 终止不是错误，已处理的品牌是否保留由外层事务决定
// ==========================================

use crate::domain::record::RecordSet;
use crate::domain::shop::Shop;
use crate::domain::Manufacturer;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::resolve_data_path;
use crate::importer::identifier::{collision_message, shop_scoped_identifier, IdentifierClaims};
use crate::importer::outcome::BatchOutcome;
use crate::importer::record_upserter::RecordUpserter;
use crate::repository::manufacturer_repo::ManufacturerRepository;
use crate::repository::media_repo::MediaRepository;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

const ENTITY: &str = "manufacturer";

pub struct ManufacturerImporter<'c> {
    repo: ManufacturerRepository<'c>,
    media: MediaRepository<'c>,
    shop: &'c Shop,
    image_dir: &'c Path,
    media_folder: String,
    upserter: RecordUpserter,
}

impl<'c> ManufacturerImporter<'c> {
    /// # 参数
    /// - image_dir: logo 路径的基准目录
    /// - media_folder: logo 文件存放的媒体目录名
    pub fn new(
        conn: &'c Connection,
        shop: &'c Shop,
        image_dir: &'c Path,
        media_folder: &str,
        language: &str,
    ) -> Self {
        Self {
            repo: ManufacturerRepository::new(conn),
            media: MediaRepository::new(conn),
            shop,
            image_dir,
            media_folder: media_folder.to_string(),
            upserter: RecordUpserter::new(language),
        }
    }

    /// 导入一个品牌数据文件
    #[instrument(skip_all, fields(shop_id = self.shop.id, records = records.len()))]
    pub fn import(&self, records: RecordSet) -> ImportResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        let mut entries: Vec<(String, _)> = records
            .into_iter()
            .map(|(key, record)| (key.trim().to_string(), record))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut claims = IdentifierClaims::new();

        for (natural_key, mut record) in entries {
            if record.is_ignored() {
                outcome.counts.record_ignored();
                continue;
            }

            let identifier = shop_scoped_identifier(self.shop.id, &natural_key);
            if let Some(owner) = claims.claim(&identifier, &natural_key) {
                outcome.warn(ENTITY, &natural_key, collision_message(&identifier, &owner));
                continue;
            }

            let logo = record.take("logo").and_then(|value| {
                value
                    .scalar_text()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            });

            let logo_id = match logo {
                Some(logo) => {
                    let Some(path) = resolve_data_path(self.image_dir, &logo) else {
                        outcome.warn(
                            ENTITY,
                            &natural_key,
                            format!("logo 路径无效: {}，终止本批次剩余品牌", logo),
                        );
                        outcome.aborted = true;
                        return Ok(outcome);
                    };
                    if !path.is_file() {
                        outcome.warn(
                            ENTITY,
                            &natural_key,
                            format!("logo 文件不存在: {}，终止本批次剩余品牌", path.display()),
                        );
                        outcome.aborted = true;
                        return Ok(outcome);
                    }
                    let data = fs::read(&path)?;
                    let (file, created) = self.media.store_file(&self.media_folder, &logo, &data)?;
                    debug!(logo = %logo, file_id = file.id, created, "品牌 logo 已存储");
                    Some(file.id)
                }
                None => None,
            };

            let Some(upserted) = self.upserter.upsert::<Manufacturer, _>(&self.repo, &identifier, &record)? else {
                outcome.counts.record_ignored();
                continue;
            };

            let mut manufacturer = upserted.entity;
            manufacturer.natural_key = natural_key.clone();
            if manufacturer.name.trim().is_empty() {
                manufacturer.name = natural_key.clone();
            }
            if logo_id.is_some() {
                manufacturer.logo_id = logo_id;
            }

            let id = self.repo.save(&mut manufacturer)?;
            self.repo.set_shops(id, &[self.shop.id])?;
            outcome.counts.record_saved(upserted.created);
            debug!(identifier = %identifier, created = upserted.created, "品牌已保存");
        }

        info!(
            created = outcome.counts.created,
            updated = outcome.counts.updated,
            ignored = outcome.counts.ignored,
            "品牌导入完成"
        );
        Ok(outcome)
    }
}
