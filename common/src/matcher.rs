//! 料理名 → カタログキー照合
//!
//! 3段階で照合し、候補が見つかった段階で終了する:
//! 1. キー包含: 説明とキーのどちらかがもう一方を含む（先勝ち）
//! 2. 表示名包含: en → ru → uk の順で表示名と包含判定（先勝ち）
//! 3. 単語スコア: 説明の各単語がキー・各表示名に含まれる数を加点（最高点、同点は先勝ち）
//!
//! 比較はすべて小文字化して行う。区切り文字の正規化はしない。

use crate::catalog::{Catalog, CatalogEntry};
use serde::Serialize;

/// 照合が成立した段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    KeyContainment,
    NameContainment,
    WordOverlap,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::KeyContainment => write!(f, "キー包含"),
            MatchTier::NameContainment => write!(f, "表示名包含"),
            MatchTier::WordOverlap => write!(f, "単語スコア"),
        }
    }
}

/// 照合結果（キーと成立段階）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodMatch<'a> {
    pub key: &'a str,
    pub tier: MatchTier,
}

/// 説明に最も合うカタログキーを返す
pub fn match_food<'a>(description: &str, catalog: &'a Catalog) -> Option<&'a str> {
    match_food_with_tier(description, catalog).map(|m| m.key)
}

/// 説明に最も合うカタログキーと成立段階を返す
///
/// 空文字・空白のみの説明は照合しない（空文字は任意の文字列に含まれるため）。
pub fn match_food_with_tier<'a>(description: &str, catalog: &'a Catalog) -> Option<FoodMatch<'a>> {
    if description.trim().is_empty() {
        return None;
    }
    let food_lower = description.to_lowercase();

    if let Some(entry) = catalog
        .iter()
        .find(|entry| contains_either(&food_lower, entry.key_lower()))
    {
        return Some(FoodMatch {
            key: entry.key(),
            tier: MatchTier::KeyContainment,
        });
    }

    if let Some(entry) = catalog
        .iter()
        .find(|entry| entry.names_lower().any(|name| contains_either(&food_lower, name)))
    {
        return Some(FoodMatch {
            key: entry.key(),
            tier: MatchTier::NameContainment,
        });
    }

    best_word_overlap(&food_lower, catalog).map(|entry| FoodMatch {
        key: entry.key(),
        tier: MatchTier::WordOverlap,
    })
}

/// 単語スコア（3段階目）
///
/// スコアが0より大きいエントリのうち最高点を返す。同点なら先に現れたもの。
fn best_word_overlap<'a>(food_lower: &str, catalog: &'a Catalog) -> Option<&'a CatalogEntry> {
    let words: Vec<&str> = food_lower.split_whitespace().collect();

    let mut best: Option<&CatalogEntry> = None;
    let mut best_score = 0;

    for entry in catalog.iter() {
        let score = word_overlap_score(&words, entry);
        if score > best_score {
            best_score = score;
            best = Some(entry);
        }
    }

    best
}

/// 単語ごとに、キーに含まれれば+1、含まれる表示名1つにつき+1
fn word_overlap_score(words: &[&str], entry: &CatalogEntry) -> usize {
    words
        .iter()
        .map(|word| {
            let in_key = usize::from(entry.key_lower().contains(word));
            let in_names = entry.names_lower().filter(|name| name.contains(word)).count();
            in_key + in_names
        })
        .sum()
}

fn contains_either(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}
