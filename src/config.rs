use crate::error::{FoodAiError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// 既定の食品カタログ（JSON/CSV）
    pub catalog_path: Option<PathBuf>,
    /// 1画像あたりの上限サイズ
    pub max_upload_bytes: u64,
    /// プロンプトに添えるカタログキーの最大数
    pub prompt_hint_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".into(),
            api_base_url: "https://api.openai.com/v1".into(),
            max_tokens: 500,
            temperature: 0.3,
            timeout_seconds: 120,
            catalog_path: None,
            max_upload_bytes: 16 * 1024 * 1024,
            prompt_hint_limit: 50,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FoodAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("food-photo-ai").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(FoodAiError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn set_catalog_path(&mut self, path: PathBuf) -> Result<()> {
        self.catalog_path = Some(path);
        self.save()
    }

    /// 引数指定 → 設定ファイルの順でカタログパスを決定
    pub fn resolve_catalog_path(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        explicit
            .or_else(|| self.catalog_path.clone())
            .ok_or_else(|| {
                FoodAiError::Config(
                    "カタログが指定されていません。--catalog または `food-photo config --set-catalog` で指定してください".into(),
                )
            })
    }
}
