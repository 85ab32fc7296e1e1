//! Visionレスポンスパーサー
//!
//! モデルのテキスト応答からJSON配列を抽出し、
//! DetectedFoodItem の列に変換する

use crate::error::{Error, Result};
use crate::types::DetectedFoodItem;
use serde_json::Value;

/// レスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初の `[` から最後の `]` まで
/// 3. エラー
///
/// # Examples
/// ```
/// use food_photo_common::extract_json;
///
/// let response = "Sure! [{\"food\": \"apple\"}]";
/// let json = extract_json(response).unwrap();
/// assert_eq!(json, "[{\"food\": \"apple\"}]");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + "```json".len();
        if let Some(end_offset) = response[start..].find("```") {
            return Ok(response[start..start + end_offset].trim());
        }
    }

    if let (Some(start), Some(end)) = (response.find('['), response.rfind(']')) {
        if end >= start {
            return Ok(&response[start..=end]);
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 検出レスポンスをパース
///
/// 配列全体が壊れている場合はエラー。
/// 個々の要素が不正な場合（オブジェクトでない、説明が文字列でない等）はその要素だけ読み飛ばす。
pub fn parse_detection_response(response: &str) -> Result<Vec<DetectedFoodItem>> {
    let json_str = extract_json(response)?;
    let values: Vec<Value> = serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("検出結果 JSONパースエラー: {}", e)))?;

    Ok(values
        .into_iter()
        .filter_map(|value| serde_json::from_value::<DetectedFoodItem>(value).ok())
        .collect())
}
