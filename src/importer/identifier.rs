// ==========================================
// 商品目录导入 - 标识符与 slug 生成
// ==========================================
// 店铺范围标识符: "{shop_id}-{slug(natural_key)}"
// 约束: 同一店铺内相同自然键总是得到相同标识符（重复导入幂等）
// ==========================================

use crate::domain::record::{FieldValue, Record};
use indexmap::IndexMap;
use sha1::{Digest, Sha1};
use std::collections::HashMap;

/// 常见带重音拉丁字母的 ASCII 折叠
fn fold_accent(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'œ' => "oe",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

/// 生成 URL 友好的 slug
///
/// 规则:
/// - 转小写，保留 ASCII 字母数字与下划线，重音字母折叠为 ASCII
/// - 空白与连字符视为分隔符，连续分隔符合并为一个 `-`
/// - 其余字符丢弃；去除首尾的 `-` 与 `_`
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;

    for c in value.chars().flat_map(char::to_lowercase) {
        let piece: Option<&str> = if c.is_ascii_alphanumeric() || c == '_' {
            None
        } else if let Some(folded) = fold_accent(c) {
            Some(folded)
        } else {
            if c.is_whitespace() || c == '-' {
                pending_separator = true;
            }
            continue;
        };

        if pending_separator && !slug.is_empty() {
            slug.push('-');
        }
        pending_separator = false;
        match piece {
            Some(folded) => slug.push_str(folded),
            None => slug.push(c),
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// 生成店铺范围标识符
///
/// 自然键无法生成 slug 时（例如全部为非拉丁字符），
/// 使用自然键 SHA-1 的前 12 位十六进制作为替代。
pub fn shop_scoped_identifier(shop_id: i64, natural_key: &str) -> String {
    let natural_key = natural_key.trim();
    let mut slug = slugify(natural_key);
    if slug.is_empty() {
        let digest = format!("{:x}", Sha1::digest(natural_key.as_bytes()));
        slug = format!("k{}", &digest[..12]);
    }
    format!("{}-{}", shop_id, slug)
}

/// 单个批次内已占用的标识符
///
/// 不同自然键可能生成相同标识符（大小写、标点差异），
/// 后出现的记录不能覆盖先出现的记录。
#[derive(Debug, Default)]
pub struct IdentifierClaims {
    // 标识符 → 首个占用它的自然键
    claimed: HashMap<String, String>,
}

impl IdentifierClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记标识符
    ///
    /// # 返回
    /// - None: 登记成功（或同一自然键重复登记）
    /// - Some(自然键): 标识符已被另一个自然键占用
    pub fn claim(&mut self, identifier: &str, natural_key: &str) -> Option<String> {
        match self.claimed.get(identifier) {
            Some(owner) if owner != natural_key => Some(owner.clone()),
            Some(_) => None,
            None => {
                self.claimed
                    .insert(identifier.to_string(), natural_key.to_string());
                None
            }
        }
    }
}

/// 标识符冲突的警告文本
pub fn collision_message(identifier: &str, owner: &str) -> String {
    format!("标识符 {} 已被记录 {} 使用，本记录已跳过", identifier, owner)
}

/// 记录缺少 slug 字段时，按 name 字段生成
///
/// - name 为 语言 → 文本 映射: 生成同结构的 slug 映射
/// - name 为标量: 生成标量 slug
/// - name 缺失或为空: 不做处理
pub fn ensure_slugged_value(record: &mut Record, slug_field: &str, source_field: &str) {
    if record.contains(slug_field) {
        return;
    }

    let slug = match record.get(source_field) {
        Some(FieldValue::Map(by_language)) => {
            let slugs: IndexMap<String, FieldValue> = by_language
                .iter()
                .filter_map(|(language, value)| {
                    value
                        .scalar_text()
                        .map(|text| slugify(&text))
                        .filter(|slug| !slug.is_empty())
                        .map(|slug| (language.clone(), FieldValue::Text(slug)))
                })
                .collect();
            if slugs.is_empty() {
                return;
            }
            FieldValue::Map(slugs)
        }
        Some(value) => match value.scalar_text().map(|text| slugify(&text)) {
            Some(slug) if !slug.is_empty() => FieldValue::Text(slug),
            _ => return,
        },
        None => return,
    };

    record.insert(slug_field, slug);
}
