// ==========================================
// 商品目录导入 - 通用记录合并器
// ==========================================
// 职责: 将一条扁平记录合并进已存在（或新建）的实体
// 规则:
//   - `ignored` 为真的记录直接跳过
//   - 多语言字段: 语言 → 值 映射逐语言写入；标量写入当前语言
//   - 其余标量字段按白名单映射写入；非标量丢弃
//   - 记录中未出现的字段保持原值
// 约束: 只构造实体，不负责保存
// ==========================================

use crate::domain::record::{FieldValue, Record};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{TranslatedFieldSpec, Upsertable};
use crate::repository::entity_loader::EntityLoader;
use tracing::debug;

/// 合并结果
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted<E> {
    pub entity: E,
    pub created: bool, // true: 新实体（尚未保存）
}

pub struct RecordUpserter {
    language: String,
}

impl RecordUpserter {
    /// # 参数
    /// - language: 当前语言（标量形式的多语言字段写入该语言）
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// 合并记录
    ///
    /// # 返回
    /// - Ok(None): 记录被标记为忽略
    /// - Ok(Some(Upserted)): 待保存的实体
    /// - Err: 读取失败 / 字段值无法转换
    pub fn upsert<E, L>(
        &self,
        loader: &L,
        identifier: &str,
        record: &Record,
    ) -> ImportResult<Option<Upserted<E>>>
    where
        E: Upsertable + 'static,
        E::Translation: 'static,
        L: EntityLoader<E>,
    {
        if record.is_ignored() {
            debug!(entity = E::ENTITY, identifier, "记录标记为忽略");
            return Ok(None);
        }

        let (mut entity, created) = match loader.load_by_identifier(identifier)? {
            Some(existing) => (existing, false),
            None => (E::with_identifier(identifier), true),
        };

        for (field, value) in record.iter() {
            if field == "ignored" {
                continue;
            }

            if let Some(spec) = E::find_translated_field(field) {
                self.apply_translated(&mut entity, spec, field, value);
                continue;
            }

            if !value.is_scalar() {
                debug!(entity = E::ENTITY, identifier, field = %field, "非标量字段，丢弃");
                continue;
            }

            match E::find_scalar_field(field) {
                Some(spec) => {
                    spec.apply(&mut entity, value)
                        .map_err(|message| ImportError::FieldValueError {
                            entity: E::ENTITY,
                            identifier: identifier.to_string(),
                            field: field.clone(),
                            message,
                        })?;
                }
                None => {
                    debug!(entity = E::ENTITY, identifier, field = %field, "未知字段，忽略");
                }
            }
        }

        Ok(Some(Upserted { entity, created }))
    }

    fn apply_translated<E: Upsertable>(
        &self,
        entity: &mut E,
        spec: &TranslatedFieldSpec<E::Translation>,
        field: &str,
        value: &FieldValue,
    ) {
        match value {
            FieldValue::Map(by_language) => {
                for (language, text) in by_language {
                    match text.scalar_text() {
                        Some(text) => {
                            if let Some(translation) = entity.translation_mut(language) {
                                (spec.setter)(translation, Some(text));
                            }
                        }
                        None => {
                            debug!(entity = E::ENTITY, field, language = %language, "多语言字段值非标量，丢弃");
                        }
                    }
                }
            }
            scalar if scalar.is_scalar() => {
                if let Some(translation) = entity.translation_mut(&self.language) {
                    (spec.setter)(translation, scalar.scalar_text());
                }
            }
            _ => {
                debug!(entity = E::ENTITY, field, "多语言字段格式无效，丢弃");
            }
        }
    }
}
