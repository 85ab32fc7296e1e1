//! 食品カタログモジュール
//!
//! 照合先となる食品データベースを管理する。
//! JSON（`{ "<key>": { "name_en": ..., "name_ru": ..., "name_uk": ..., ... } }`）
//! またはCSVから読み込み、読み込み後は変更しない。
//!
//! エントリの並び順はソースの順序をそのまま保持する。
//! 照合で同順位の候補が複数ある場合は先に登録されたものが勝つ。

use crate::error::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::error::Category;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// 表示名の言語（照合時はこの順序で確認する）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
    Uk,
}

impl Language {
    /// 照合順: en → ru → uk
    pub const ALL: [Language; 3] = [Language::En, Language::Ru, Language::Uk];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Uk => "uk",
        }
    }

    /// ソースデータ上のフィールド名（`name_en` など）
    pub fn name_field(&self) -> &'static str {
        match self {
            Language::En => "name_en",
            Language::Ru => "name_ru",
            Language::Uk => "name_uk",
        }
    }

    fn from_name_field(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.name_field() == field)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// カタログの1エントリ
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    key: String,
    names: BTreeMap<Language, String>,
    /// 栄養成分など照合に使わない属性（そのまま保持）
    attributes: Map<String, Value>,
    key_lower: String,
    names_lower: BTreeMap<Language, String>,
}

impl CatalogEntry {
    /// エントリを作成
    ///
    /// 空白のみの表示名は登録しない（空文字は任意の説明に「含まれる」ため）。
    pub fn new<I, S>(key: impl Into<String>, names: I, attributes: Map<String, Value>) -> Self
    where
        I: IntoIterator<Item = (Language, S)>,
        S: Into<String>,
    {
        let key = key.into();
        let names: BTreeMap<Language, String> = names
            .into_iter()
            .map(|(lang, name)| (lang, name.into()))
            .filter(|(_, name)| !name.trim().is_empty())
            .collect();
        let names_lower = names
            .iter()
            .map(|(lang, name)| (*lang, name.to_lowercase()))
            .collect();

        Self {
            key_lower: key.to_lowercase(),
            key,
            names,
            attributes,
            names_lower,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self, lang: Language) -> Option<&str> {
        self.names.get(&lang).map(|s| s.as_str())
    }

    /// 表示名を照合順（en, ru, uk）で列挙
    pub fn names(&self) -> impl Iterator<Item = (Language, &str)> {
        self.names.iter().map(|(lang, name)| (*lang, name.as_str()))
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub(crate) fn key_lower(&self) -> &str {
        &self.key_lower
    }

    pub(crate) fn names_lower(&self) -> impl Iterator<Item = &str> {
        self.names_lower.values().map(|s| s.as_str())
    }

    /// ソース形式のJSONオブジェクトへ変換
    fn to_source_json(&self) -> Value {
        let mut obj = Map::new();
        for (lang, name) in self.names() {
            obj.insert(lang.name_field().to_string(), Value::String(name.to_string()));
        }
        for (field, value) in &self.attributes {
            obj.insert(field.clone(), value.clone());
        }
        Value::Object(obj)
    }
}

/// 食品カタログ全体（読み込み後は不変）
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// 全エントリ（ソース順）
    entries: Vec<CatalogEntry>,
    /// キー → entries のインデックス
    index: HashMap<String, usize>,
}

impl Catalog {
    /// エントリ列からカタログを構築
    ///
    /// 空キー・重複キーはエラー。
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if entry.key.trim().is_empty() {
                return Err(Error::Catalog(format!("空のキー（{}番目のエントリ）", i + 1)));
            }
            if index.insert(entry.key.clone(), i).is_some() {
                return Err(Error::Catalog(format!("重複キー: {}", entry.key)));
            }
        }

        Ok(Self { entries, index })
    }

    /// JSONファイルから読み込み
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// JSON文字列から読み込み
    ///
    /// トップレベルはキー → エントリのオブジェクト。
    /// `name_en` / `name_ru` / `name_uk` 以外のフィールドは属性として保持する。
    /// 重複キーは `from_entries` で検出されエラーになる。
    pub fn from_json_str(content: &str) -> Result<Self> {
        let RawEntries(pairs) = serde_json::from_str(content).map_err(|e| match e.classify() {
            Category::Data => Error::Catalog(format!("トップレベルがオブジェクトではありません: {}", e)),
            _ => Error::Json(e),
        })?;

        let mut entries = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let Value::Object(fields) = value else {
                return Err(Error::Catalog(format!("エントリがオブジェクトではありません: {}", key)));
            };

            let mut names = Vec::new();
            let mut attributes = Map::new();
            for (field, value) in fields {
                match Language::from_name_field(&field) {
                    Some(lang) => match value {
                        Value::String(name) => names.push((lang, name)),
                        Value::Null => {}
                        other => {
                            return Err(Error::Catalog(format!(
                                "{}.{} が文字列ではありません: {}",
                                key, field, other
                            )));
                        }
                    },
                    None => {
                        attributes.insert(field, value);
                    }
                }
            }

            entries.push(CatalogEntry::new(key, names, attributes));
        }

        Self::from_entries(entries)
    }

    /// CSVファイルから読み込み
    pub fn from_csv_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_csv_str(&content)
    }

    /// CSV文字列から読み込み
    ///
    /// 1行目はヘッダー。`key` 列は必須、`name_en` / `name_ru` / `name_uk` は任意。
    /// その他の列は属性になり、数値として読めるものは数値で保持する。
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut lines = content.lines().filter(|line| !line.trim().is_empty());

        let header: Vec<Cow<str>> = match lines.next() {
            Some(line) => parse_csv_line(line),
            None => return Ok(Self::default()),
        };
        let key_col = header
            .iter()
            .position(|h| h == "key")
            .ok_or_else(|| Error::Catalog("CSVヘッダーに key 列がありません".into()))?;

        let mut entries = Vec::new();
        for line in lines {
            let fields = parse_csv_line(line);
            let key = fields.get(key_col).map(|f| &**f).unwrap_or_default();

            let mut names = Vec::new();
            let mut attributes = Map::new();
            for (col, name) in header.iter().enumerate() {
                if col == key_col {
                    continue;
                }
                let value = fields.get(col).map(|f| &**f).unwrap_or_default();
                if let Some(lang) = Language::from_name_field(name) {
                    names.push((lang, value.to_string()));
                } else if !value.is_empty() {
                    attributes.insert(name.to_string(), csv_value(value));
                }
            }

            entries.push(CatalogEntry::new(key, names, attributes));
        }

        Self::from_entries(entries)
    }

    /// 全エントリをソース順で列挙
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// キー一覧（ソース順）
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// ソース形式のJSONを生成（順序保持）
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|e| (e.key.clone(), e.to_source_json()))
            .collect();
        Value::Object(map)
    }

    /// プロンプト用のキー一覧（先頭 `limit` 件をカンマ区切り）
    pub fn prompt_hint(&self, limit: usize) -> String {
        self.keys().take(limit).collect::<Vec<_>>().join(", ")
    }
}

/// CSVセル値を属性値に変換
fn csv_value(value: &str) -> Value {
    value
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

/// CSV行をパース（ダブルクォート対応、クォート内の `""` は `"` に戻す）
fn parse_csv_line(line: &str) -> Vec<Cow<'_, str>> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut field_start = 0;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(trim_quotes(&line[field_start..i]));
                field_start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(trim_quotes(&line[field_start..]));

    fields
}

fn trim_quotes(s: &str) -> Cow<'_, str> {
    let s = s.trim();
    if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
        let inner = &s[1..s.len() - 1];
        if inner.contains("\"\"") {
            Cow::Owned(inner.replace("\"\"", "\""))
        } else {
            Cow::Borrowed(inner)
        }
    } else {
        Cow::Borrowed(s)
    }
}

/// トップレベルのキーと値の組（ソース順、重複キーも残す）
struct RawEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of catalog key to entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<RawEntries, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                    pairs.push((key, value));
                }
                Ok(RawEntries(pairs))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_JSON: &str = r#"{
        "chicken_breast_pieces": {
            "name_en": "Chicken breast pieces",
            "name_ru": "Куриная грудка кусочками",
            "name_uk": "Куряча грудка шматочками",
            "kcal": 165,
            "protein": 31.0
        },
        "cooked_rice": {
            "name_en": "Cooked rice",
            "name_ru": "Рис варёный",
            "kcal": 130
        },
        "apple": {
            "name_en": "Apple",
            "kcal": 52
        }
    }"#;

    const TEST_CSV: &str = r#"key,name_en,name_ru,name_uk,kcal,unit
"cooked_rice","Cooked rice","Рис варёный","Рис варений",130,g
"borscht","Borscht, beet soup","Борщ","Борщ",62,ml
"#;

    #[test]
    fn test_load_json() {
        let catalog = Catalog::from_json_str(TEST_JSON).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_json_preserves_order() {
        let catalog = Catalog::from_json_str(TEST_JSON).unwrap();
        let keys: Vec<_> = catalog.keys().collect();
        assert_eq!(keys, vec!["chicken_breast_pieces", "cooked_rice", "apple"]);
    }

    #[test]
    fn test_json_names_and_attributes() {
        let catalog = Catalog::from_json_str(TEST_JSON).unwrap();
        let rice = catalog.get("cooked_rice").unwrap();
        assert_eq!(rice.name(Language::En), Some("Cooked rice"));
        assert_eq!(rice.name(Language::Ru), Some("Рис варёный"));
        assert_eq!(rice.name(Language::Uk), None);
        assert_eq!(rice.attributes().get("kcal"), Some(&Value::from(130)));
        assert!(rice.attributes().get("name_en").is_none());
    }

    #[test]
    fn test_names_in_check_order() {
        let entry = CatalogEntry::new(
            "x",
            [(Language::Uk, "c"), (Language::En, "a"), (Language::Ru, "b")],
            Map::new(),
        );
        let langs: Vec<_> = entry.names().map(|(lang, _)| lang).collect();
        assert_eq!(langs, vec![Language::En, Language::Ru, Language::Uk]);
    }

    #[test]
    fn test_blank_names_dropped() {
        let entry = CatalogEntry::new("x", [(Language::En, "  "), (Language::Ru, "имя")], Map::new());
        assert_eq!(entry.name(Language::En), None);
        assert_eq!(entry.name(Language::Ru), Some("имя"));
    }

    #[test]
    fn test_json_not_object() {
        let result = Catalog::from_json_str("[1, 2, 3]");
        assert!(matches!(result, Err(Error::Catalog(_))));

        let result = Catalog::from_json_str(r#"{"rice": 130}"#);
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_json_non_string_name() {
        let result = Catalog::from_json_str(r#"{"rice": {"name_en": 5}}"#);
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_json_invalid() {
        let result = Catalog::from_json_str("{ invalid");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let entries = vec![
            CatalogEntry::new("rice", Vec::<(Language, String)>::new(), Map::new()),
            CatalogEntry::new("rice", Vec::<(Language, String)>::new(), Map::new()),
        ];
        let result = Catalog::from_entries(entries);
        assert!(matches!(result, Err(Error::Catalog(msg)) if msg.contains("rice")));
    }

    #[test]
    fn test_json_duplicate_key_rejected() {
        let json = r#"{"rice": {"name_en": "A"}, "apple": {}, "rice": {"name_en": "B"}}"#;
        let result = Catalog::from_json_str(json);
        assert!(matches!(result, Err(Error::Catalog(msg)) if msg.contains("rice")));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = Catalog::from_json_str(r#"{"": {"name_en": "Nothing"}}"#);
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_load_csv() {
        let catalog = Catalog::from_csv_str(TEST_CSV).unwrap();
        assert_eq!(catalog.len(), 2);

        let borscht = catalog.get("borscht").unwrap();
        assert_eq!(borscht.name(Language::En), Some("Borscht, beet soup"));
        assert_eq!(borscht.name(Language::Uk), Some("Борщ"));
        assert_eq!(borscht.attributes().get("kcal"), Some(&Value::from(62.0)));
        assert_eq!(borscht.attributes().get("unit"), Some(&Value::from("ml")));
    }

    #[test]
    fn test_csv_missing_key_column() {
        let result = Catalog::from_csv_str("name_en,kcal\nRice,130\n");
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_csv_empty() {
        let catalog = Catalog::from_csv_str("").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_to_json_source_shape() {
        let catalog = Catalog::from_json_str(TEST_JSON).unwrap();
        let json = catalog.to_json();
        assert_eq!(json["apple"]["name_en"], "Apple");
        assert_eq!(json["apple"]["kcal"], 52);

        let reloaded = Catalog::from_json_str(&json.to_string()).unwrap();
        assert_eq!(reloaded.keys().collect::<Vec<_>>(), catalog.keys().collect::<Vec<_>>());
    }

    #[test]
    fn test_prompt_hint() {
        let catalog = Catalog::from_json_str(TEST_JSON).unwrap();
        assert_eq!(catalog.prompt_hint(2), "chicken_breast_pieces, cooked_rice");
        assert_eq!(catalog.prompt_hint(0), "");
    }

    #[test]
    fn test_parse_csv_line_quoted_comma() {
        let fields = parse_csv_line(r#"a,"b, c",d"#);
        assert_eq!(fields, vec!["a", "b, c", "d"]);
    }

    #[test]
    fn test_csv_escaped_quote() {
        let csv = "key,name_en\n\"kiev\",\"Chicken \"\"Kiev\"\"\"\n";
        let catalog = Catalog::from_csv_str(csv).unwrap();
        let kiev = catalog.get("kiev").unwrap();
        assert_eq!(kiev.name(Language::En), Some(r#"Chicken "Kiev""#));

        let fields = parse_csv_line(r#""say ""hi""",x"#);
        assert_eq!(fields, vec![r#"say "hi""#, "x"]);
    }
}
