//! 照合パイプラインの型定義
//!
//! CLIとライブラリ利用側で共有される型:
//! - DetectedFoodItem: 画像認識（Vision）の出力1件
//! - MatchResult: カタログ照合の最終出力1件

use serde::{Deserialize, Deserializer, Serialize};

/// Vision出力の1件: 料理の説明と推定グラム数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedFoodItem {
    /// 自由記述の料理名（Visionプロンプトでは "food" として出力される）
    #[serde(alias = "food")]
    pub description: String,

    /// 推定グラム数（未指定時は照合時に既定値を使う）
    #[serde(
        deserialize_with = "deserialize_grams",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_grams: Option<f64>,
}

impl DetectedFoodItem {
    pub fn new(description: impl Into<String>, estimated_grams: Option<f64>) -> Self {
        Self {
            description: description.into(),
            estimated_grams,
        }
    }
}

/// 照合結果: カタログキー + 信頼度 + 推定グラム数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub key: String,
    pub confidence: f64,
    pub estimated_grams: f64,
}

/// グラム数は数値・数値文字列・null を受け付ける
///
/// モデルが `"150"` のように文字列で返すことがあるため。
/// 数値として解釈できない値は None 扱い。
fn deserialize_grams<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_item_default() {
        let item = DetectedFoodItem::default();
        assert_eq!(item.description, "");
        assert_eq!(item.estimated_grams, None);
    }

    #[test]
    fn test_detected_item_deserialize_food_alias() {
        let json = r#"{"food": "chicken breast", "estimated_grams": 150}"#;

        let item: DetectedFoodItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.description, "chicken breast");
        assert_eq!(item.estimated_grams, Some(150.0));
    }

    #[test]
    fn test_detected_item_deserialize_description() {
        let json = r#"{"description": "cooked rice", "estimated_grams": 200.5}"#;

        let item: DetectedFoodItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.description, "cooked rice");
        assert_eq!(item.estimated_grams, Some(200.5));
    }

    #[test]
    fn test_detected_item_missing_grams() {
        let json = r#"{"food": "steamed broccoli"}"#;

        let item: DetectedFoodItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.estimated_grams, None);
    }

    #[test]
    fn test_detected_item_grams_as_string() {
        let json = r#"{"food": "soup", "estimated_grams": " 300 "}"#;
        let item: DetectedFoodItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.estimated_grams, Some(300.0));

        let json = r#"{"food": "soup", "estimated_grams": "a bowl"}"#;
        let item: DetectedFoodItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.estimated_grams, None);

        let json = r#"{"food": "soup", "estimated_grams": null}"#;
        let item: DetectedFoodItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.estimated_grams, None);
    }

    #[test]
    fn test_detected_item_missing_description() {
        let json = r#"{"estimated_grams": 80}"#;

        let item: DetectedFoodItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.description, "");
    }

    #[test]
    fn test_match_result_serialize() {
        let result = MatchResult {
            key: "cooked_rice".to_string(),
            confidence: 0.8,
            estimated_grams: 250.0,
        };

        let json = serde_json::to_string(&result).expect("シリアライズ失敗");
        assert_eq!(
            json,
            r#"{"key":"cooked_rice","confidence":0.8,"estimated_grams":250.0}"#
        );
    }
}
