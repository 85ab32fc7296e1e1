//! 照合結果レポート

use crate::error::Result;
use chrono::{DateTime, Utc};
use food_photo_common::{MatchResult, ReconcileOutcome};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 1画像分の照合結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReport {
    pub file_name: String,
    pub analyzed_at: DateTime<Utc>,
    pub detected_items: Vec<MatchResult>,
    /// カタログに該当しなかった説明（出力の detected_items には含めない）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmatched: Vec<String>,
}

impl ImageReport {
    pub fn from_outcomes(file_name: &str, outcomes: Vec<ReconcileOutcome>) -> Self {
        let mut detected_items = Vec::new();
        let mut unmatched = Vec::new();

        for outcome in outcomes {
            match outcome {
                ReconcileOutcome::Matched { result, tier } => {
                    tracing::debug!("{}: {} ({})", file_name, result.key, tier);
                    detected_items.push(result);
                }
                ReconcileOutcome::Unmatched { description } => {
                    tracing::info!("{}: カタログに該当なし: {}", file_name, description);
                    unmatched.push(description);
                }
                ReconcileOutcome::Skipped => {}
            }
        }

        Self {
            file_name: file_name.to_string(),
            analyzed_at: Utc::now(),
            detected_items,
            unmatched,
        }
    }
}

/// レポートをJSONで出力（出力先未指定なら標準出力）
pub fn write_reports(reports: &[ImageReport], output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
        }
        None => println!("{}", json),
    }
    Ok(())
}
