use crate::error::{FoodAiError, Result};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub mime_type: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// ファイル1枚、またはフォルダ直下の画像を列挙
///
/// フォルダ指定時、対応外・サイズ超過のファイルは警告して除外する。
/// ファイル指定時はエラーにする。
pub fn scan_path(path: &Path, max_bytes: u64) -> Result<Vec<ImageInfo>> {
    if path.is_file() {
        return Ok(vec![inspect_image(path, max_bytes)?]);
    }
    scan_folder(path, max_bytes)
}

pub fn scan_folder(folder: &Path, max_bytes: u64) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(FoodAiError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || !has_image_extension(path) {
            continue;
        }

        match inspect_image(path, max_bytes) {
            Ok(info) => images.push(info),
            Err(e) => tracing::warn!("画像をスキップ: {}", e),
        }
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 拡張子とサイズを検証して ImageInfo を作る（画像のデコードはしない）
pub fn inspect_image(path: &Path, max_bytes: u64) -> Result<ImageInfo> {
    if !path.exists() {
        return Err(FoodAiError::FileNotFound(path.display().to_string()));
    }
    if !has_image_extension(path) {
        return Err(FoodAiError::UnsupportedFile(path.display().to_string()));
    }

    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(FoodAiError::FileTooLarge {
            path: path.display().to_string(),
            size,
            limit: max_bytes,
        });
    }

    let mime_type = ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/png");

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(ImageInfo {
        path: path.to_path_buf(),
        file_name,
        size,
        mime_type: mime_type.to_string(),
    })
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_image_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}
