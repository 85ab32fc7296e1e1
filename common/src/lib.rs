//! Food Photo AI Common Library
//!
//! 食品カタログ・照合ロジック・Visionレスポンス解析など、I/Oを伴わない共通部分

pub mod types;
pub mod catalog;
pub mod matcher;
pub mod reconcile;
pub mod error;
pub mod parser;
pub mod prompts;

pub use types::{DetectedFoodItem, MatchResult};
pub use catalog::{Catalog, CatalogEntry, Language};
pub use matcher::{match_food, match_food_with_tier, FoodMatch, MatchTier};
pub use reconcile::{
    reconcile, reconcile_detailed, ReconcileOutcome, DEFAULT_ESTIMATED_GRAMS, MATCH_CONFIDENCE,
};
pub use error::{Error, Result};
pub use parser::{extract_json, parse_detection_response};
pub use prompts::build_detection_prompt;
