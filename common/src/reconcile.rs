//! 検出結果とカタログの突き合わせ
//!
//! Vision出力（説明 + 推定グラム数）を1件ずつ照合し、
//! 一致したものだけを入力順で MatchResult に変換する。

use crate::catalog::Catalog;
use crate::matcher::{match_food_with_tier, MatchTier};
use crate::types::{DetectedFoodItem, MatchResult};

/// 一致時の信頼度（照合段階によらず固定）
pub const MATCH_CONFIDENCE: f64 = 0.8;

/// 推定グラム数が無い場合の既定値
pub const DEFAULT_ESTIMATED_GRAMS: f64 = 100.0;

/// 1件ごとの突き合わせ結果
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// 一致
    Matched { result: MatchResult, tier: MatchTier },
    /// カタログに該当なし（出力から除外）
    Unmatched { description: String },
    /// 説明が空のためスキップ
    Skipped,
}

impl ReconcileOutcome {
    pub fn into_result(self) -> Option<MatchResult> {
        match self {
            ReconcileOutcome::Matched { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// 検出結果をカタログと突き合わせる
///
/// 重複排除はしない（同じキーに一致した説明が2件あれば2件とも出力）。
pub fn reconcile(items: &[DetectedFoodItem], catalog: &Catalog) -> Vec<MatchResult> {
    reconcile_detailed(items, catalog)
        .into_iter()
        .filter_map(ReconcileOutcome::into_result)
        .collect()
}

/// 入力1件につき1つの ReconcileOutcome を返す
pub fn reconcile_detailed(items: &[DetectedFoodItem], catalog: &Catalog) -> Vec<ReconcileOutcome> {
    items.iter().map(|item| reconcile_item(item, catalog)).collect()
}

fn reconcile_item(item: &DetectedFoodItem, catalog: &Catalog) -> ReconcileOutcome {
    if item.description.trim().is_empty() {
        return ReconcileOutcome::Skipped;
    }

    match match_food_with_tier(&item.description, catalog) {
        Some(m) => ReconcileOutcome::Matched {
            result: MatchResult {
                key: m.key.to_string(),
                confidence: MATCH_CONFIDENCE,
                estimated_grams: item.estimated_grams.unwrap_or(DEFAULT_ESTIMATED_GRAMS),
            },
            tier: m.tier,
        },
        None => ReconcileOutcome::Unmatched {
            description: item.description.clone(),
        },
    }
}
