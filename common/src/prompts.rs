//! プロンプト生成モジュール
//!
//! Vision（料理検出）用プロンプト:
//! - build_detection_prompt: 写真から料理と推定グラム数を列挙させる

use crate::catalog::Catalog;

/// 料理検出プロンプト生成
///
/// # Arguments
/// * `catalog` - 照合先カタログ（キーをヒントとして添える）
/// * `hint_limit` - ヒントに含めるキーの最大数（0でヒントなし）
///
/// # Returns
/// 検出用のプロンプト文字列
pub fn build_detection_prompt(catalog: &Catalog, hint_limit: usize) -> String {
    let hint = catalog.prompt_hint(hint_limit);
    let known_foods = if hint.is_empty() {
        String::new()
    } else {
        format!("\n\nKnown food identifiers (use them as naming hints only): {hint}")
    };

    format!(
        r#"Analyze this food photo and identify all food items visible on the plate.

Return a JSON array with objects containing:
- "food": the name/description of the food item (in English, be specific)
- "estimated_grams": estimated portion size in grams

Focus on identifying the main food items. Be specific about the type of food (e.g., "chicken breast" not just "chicken", "cooked rice" not just "rice").

Example format:
[
  {{"food": "chicken breast", "estimated_grams": 150}},
  {{"food": "cooked rice", "estimated_grams": 200}},
  {{"food": "steamed broccoli", "estimated_grams": 100}}
]

Return ONLY valid JSON, no additional text.{known_foods}"#
    )
}
