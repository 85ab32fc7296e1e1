//! 料理検出モジュール
//!
//! 画像をVisionプロバイダへ送り、料理の説明と推定グラム数を得る。
//! カタログとの照合は matcher 側で行う。

pub mod cache;
mod openai;

pub use cache::CacheFile;
pub use openai::OpenAiVision;

use crate::error::Result;
use crate::scanner::ImageInfo;
use base64::Engine;
use food_photo_common::DetectedFoodItem;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;

/// Visionプロバイダに渡す画像
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    pub fn load(info: &ImageInfo) -> Result<Self> {
        Ok(Self {
            file_name: info.file_name.clone(),
            mime_type: info.mime_type.clone(),
            bytes: std::fs::read(&info.path)?,
        })
    }

    /// `data:<mime>;base64,<data>` 形式
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// 画像 → 料理リストを返すVisionプロバイダ
pub trait FoodDescriber {
    fn describe(
        &self,
        image: &ImageInput,
    ) -> impl Future<Output = Result<Vec<DetectedFoodItem>>> + Send;
}

/// 1画像分の検出結果
#[derive(Debug, Clone)]
pub struct ImageDetections {
    pub file_name: String,
    pub items: Vec<DetectedFoodItem>,
}

/// 画像を順に検出する
///
/// 1枚の失敗で全体は止めない（警告を出し、その画像は検出なしとして扱う）。
/// `cache` 指定時はキャッシュ済みの画像でAPIを呼ばない。
pub async fn detect_images<D: FoodDescriber>(
    describer: &D,
    images: &[ImageInfo],
    mut cache: Option<&mut CacheFile>,
    show_progress: bool,
) -> Vec<ImageDetections> {
    let progress = if show_progress {
        let bar = ProgressBar::new(images.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("  [{bar:30}] {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut results = Vec::with_capacity(images.len());

    for info in images {
        progress.set_message(info.file_name.clone());

        let items = match detect_one(describer, info, cache.as_deref_mut()).await {
            Ok(items) => {
                tracing::debug!("{}: {}件検出", info.file_name, items.len());
                items
            }
            Err(e) => {
                tracing::warn!("{}: 料理検出に失敗: {}", info.file_name, e);
                Vec::new()
            }
        };

        results.push(ImageDetections {
            file_name: info.file_name.clone(),
            items,
        });
        progress.inc(1);
    }

    progress.finish_and_clear();
    results
}

async fn detect_one<D: FoodDescriber>(
    describer: &D,
    info: &ImageInfo,
    cache: Option<&mut CacheFile>,
) -> Result<Vec<DetectedFoodItem>> {
    let input = ImageInput::load(info)?;

    let Some(cache) = cache else {
        return describer.describe(&input).await;
    };

    let hash = cache::compute_hash(&input.bytes);
    if let Some(items) = cache.get(&hash) {
        tracing::debug!("{}: キャッシュヒット", info.file_name);
        return Ok(items.to_vec());
    }

    let items = describer.describe(&input).await?;
    cache.insert(hash, info.file_name.clone(), info.size, items.clone());
    Ok(items)
}
