// ==========================================
// 商品目录导入 - 数据文件解析器
// ==========================================
// 阶段 0: 文件读取与解析
// 格式: YAML，顶层为 自然键 → 记录 的映射
// ==========================================

use crate::domain::record::{FieldValue, Record, RecordSet};
use crate::importer::error::{ImportError, ImportResult};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// 读取并解析一个数据文件
///
/// # 参数
/// - path: YAML 文件路径
///
/// # 返回
/// - Ok(RecordSet): 按文件声明顺序排列的记录；空文件返回空集合
/// - Err: 文件不存在 / 读取失败 / YAML 语法错误 / 记录不是映射
pub fn load_record_file(path: &Path) -> ImportResult<RecordSet> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)?;
    let records = parse_records(&content).map_err(|err| match err {
        ImportError::YamlParseError { message, .. } => ImportError::YamlParseError {
            file: path.display().to_string(),
            message,
        },
        other => other,
    })?;

    debug!(file = %path.display(), records = records.len(), "数据文件解析完成");
    Ok(records)
}

/// 解析 YAML 文本
pub fn parse_records(content: &str) -> ImportResult<RecordSet> {
    let document: Value =
        serde_yaml::from_str(content).map_err(|e| ImportError::YamlParseError {
            file: "<inline>".to_string(),
            message: e.to_string(),
        })?;

    let mapping = match document {
        Value::Null => return Ok(RecordSet::new()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(ImportError::InvalidRecord {
                key: "<root>".to_string(),
                message: format!("顶层必须是映射，实际为 {}", value_kind(&other)),
            })
        }
    };

    let mut records = RecordSet::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = FieldValue::from(key)
            .scalar_text()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ImportError::InvalidRecord {
                key: "<root>".to_string(),
                message: "记录键必须是非空标量".to_string(),
            })?;

        let record = match FieldValue::from(value) {
            FieldValue::Null => Record::new(),
            FieldValue::Map(fields) => fields.into_iter().collect(),
            other => {
                return Err(ImportError::InvalidRecord {
                    key,
                    message: format!("记录必须是映射，实际为 {:?}", other),
                })
            }
        };
        if records.contains_key(&key) {
            return Err(ImportError::InvalidRecord {
                key,
                message: "去除首尾空白后记录键重复".to_string(),
            });
        }
        records.insert(key, record);
    }

    Ok(records)
}

/// 解析数据文件中引用的相对路径（logo、商品图片）
///
/// # 返回
/// - Some(PathBuf): base 下的路径
/// - None: 绝对路径或包含 `..`，不允许离开 base 目录
pub fn resolve_data_path(base: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let escapes = relative.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if relative.is_absolute() || escapes {
        return None;
    }
    Some(base.join(relative))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n
                    .as_f64()
                    .map(FieldValue::Float)
                    .unwrap_or_else(|| FieldValue::Text(n.to_string())),
            },
            Value::String(s) => FieldValue::Text(s),
            Value::Sequence(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from).collect())
            }
            Value::Mapping(mapping) => {
                let mut map = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    // 非标量键无法作为字段名，丢弃
                    if let Some(key) = FieldValue::from(key).scalar_text() {
                        map.insert(key, FieldValue::from(value));
                    }
                }
                FieldValue::Map(map)
            }
            Value::Tagged(tagged) => FieldValue::from(tagged.value),
        }
    }
}
