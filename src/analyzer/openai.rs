//! OpenAI Vision連携モジュール
//!
//! Chat Completions API に画像（Data URL）と検出プロンプトを送り、
//! 応答テキストから料理リストを取り出す。

use super::{FoodDescriber, ImageInput};
use crate::config::Config;
use crate::error::{FoodAiError, Result};
use food_photo_common::{build_detection_prompt, parse_detection_response, Catalog, DetectedFoodItem};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat Completions リクエスト
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

/// Chat Completions レスポンス
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI Vision プロバイダ
pub struct OpenAiVision {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    prompt: String,
}

impl OpenAiVision {
    /// 設定とカタログからプロバイダを作成
    ///
    /// プロンプトはカタログのキーをヒントに含めるため、ここで一度だけ組み立てる。
    pub fn from_config(config: &Config, catalog: &Catalog) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", config.api_base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            prompt: build_detection_prompt(catalog, config.prompt_hint_limit),
        })
    }

    fn build_request<'a>(&'a self, data_url: String) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text { text: &self.prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    async fn call_api(&self, image: &ImageInput) -> Result<String> {
        let request = self.build_request(image.data_url());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FoodAiError::ApiCall(format!("status {}: {}", status, body)));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| FoodAiError::ApiParse(e.to_string()))?;

        first_message_text(payload)
    }
}

impl FoodDescriber for OpenAiVision {
    async fn describe(&self, image: &ImageInput) -> Result<Vec<DetectedFoodItem>> {
        tracing::debug!("{}: Vision API 呼び出し ({} bytes)", image.file_name, image.bytes.len());

        let text = self.call_api(image).await?;
        tracing::debug!("{}: レスポンス長 {} chars", image.file_name, text.len());

        parse_detection_response(&text).map_err(|e| FoodAiError::ApiParse(e.to_string()))
    }
}

fn first_message_text(payload: ChatResponse) -> Result<String> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| FoodAiError::ApiParse("空のレスポンス".into()))
}
