// ==========================================
// 商品目录导入 - 扁平数据记录
// ==========================================
// 职责: 表示数据文件中的一条记录（字段名 → 值）
// 说明: 值为标量（字符串/数字/布尔），或 语言代码 → 标量 的映射（多语言字段）
// ==========================================

use indexmap::IndexMap;

/// 记录字段值
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// 是否为标量（字符串/数字/布尔）
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            FieldValue::Bool(_) | FieldValue::Integer(_) | FieldValue::Float(_) | FieldValue::Text(_)
        )
    }

    /// 真值判断（用于 `ignored` 等开关字段）
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Integer(i) => *i != 0,
            FieldValue::Float(f) => *f != 0.0,
            FieldValue::Text(s) => {
                let s = s.trim();
                !(s.is_empty()
                    || s.eq_ignore_ascii_case("false")
                    || s.eq_ignore_ascii_case("no")
                    || s == "0")
            }
            FieldValue::List(items) => !items.is_empty(),
            FieldValue::Map(map) => !map.is_empty(),
        }
    }

    /// 标量转文本；非标量返回 None
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// 解析标识符列表
    ///
    /// 支持 YAML 列表，或逗号分隔的字符串；空白项被丢弃
    pub fn identifier_list(&self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items
                .iter()
                .filter_map(|item| item.scalar_text())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            FieldValue::Text(s) => s
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
            other => other
                .scalar_text()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .into_iter()
                .collect(),
        }
    }
}

/// 单条记录（保持数据文件中的字段顺序）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// 取出字段（保持剩余字段顺序）
    pub fn take(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.shift_remove(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 记录是否被标记为忽略
    pub fn is_ignored(&self) -> bool {
        self.fields
            .get("ignored")
            .map(FieldValue::is_truthy)
            .unwrap_or(false)
    }

    /// 读取非空文本字段（去除首尾空白）
    pub fn text(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .and_then(FieldValue::scalar_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// 一个数据文件：自然键 → 记录（保持文件声明顺序）
pub type RecordSet = IndexMap<String, Record>;

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_truthiness() {
        assert!(FieldValue::Bool(true).is_truthy());
        assert!(!FieldValue::Bool(false).is_truthy());
        assert!(FieldValue::Integer(1).is_truthy());
        assert!(!FieldValue::Integer(0).is_truthy());
        assert!(text("yes").is_truthy());
        assert!(!text("").is_truthy());
        assert!(!text("false").is_truthy());
        assert!(!FieldValue::Null.is_truthy());
        assert!(!FieldValue::List(vec![]).is_truthy());
    }

    #[test]
    fn test_identifier_list_accepts_list_and_csv() {
        let list = FieldValue::List(vec![text("dhl "), text(""), FieldValue::Integer(7)]);
        assert_eq!(list.identifier_list(), vec!["dhl", "7"]);

        let csv = text("Dog Food, Cat Food ,,");
        assert_eq!(csv.identifier_list(), vec!["Dog Food", "Cat Food"]);

        assert!(FieldValue::Null.identifier_list().is_empty());
    }

    #[test]
    fn test_record_take_and_ignored() {
        let mut record: Record = vec![
            ("name".to_string(), text("A")),
            ("ignored".to_string(), FieldValue::Bool(true)),
        ]
        .into_iter()
        .collect();

        assert!(record.is_ignored());
        assert_eq!(record.take("name"), Some(text("A")));
        assert!(!record.contains("name"));
        assert_eq!(record.len(), 1);
    }
}
