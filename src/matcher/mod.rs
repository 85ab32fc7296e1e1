//! カタログ読み込みと画像単位の照合

use crate::analyzer::ImageDetections;
use crate::error::{FoodAiError, Result};
use crate::report::ImageReport;
use food_photo_common::{reconcile_detailed, Catalog};
use rayon::prelude::*;
use std::path::Path;

/// カタログファイルを読み込む（拡張子 .csv はCSV、それ以外はJSON）
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        return Err(FoodAiError::FileNotFound(path.display().to_string()));
    }

    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let catalog = if is_csv {
        Catalog::from_csv_file(path)
    } else {
        Catalog::from_json_file(path)
    }
    .map_err(|e| FoodAiError::InvalidCatalog(format!("{}: {}", path.display(), e)))?;

    tracing::info!("カタログ読み込み: {} ({}件)", path.display(), catalog.len());
    Ok(catalog)
}

/// 画像ごとの検出結果をカタログと照合（画像単位で並列）
pub fn reconcile_images(detections: &[ImageDetections], catalog: &Catalog) -> Vec<ImageReport> {
    detections
        .par_iter()
        .map(|d| {
            let outcomes = reconcile_detailed(&d.items, catalog);
            ImageReport::from_outcomes(&d.file_name, outcomes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use food_photo_common::DetectedFoodItem;

    #[test]
    fn test_load_catalog_not_found() {
        let result = load_catalog(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(FoodAiError::FileNotFound(_))));
    }

    #[test]
    fn test_load_catalog_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("db.json");
        std::fs::write(&json_path, r#"{"apple": {"name_en": "Apple"}}"#).unwrap();
        assert_eq!(load_catalog(&json_path).unwrap().len(), 1);

        let csv_path = dir.path().join("db.CSV");
        std::fs::write(&csv_path, "key,name_en\napple,Apple\npear,Pear\n").unwrap();
        assert_eq!(load_catalog(&csv_path).unwrap().len(), 2);
    }

    #[test]
    fn test_load_catalog_duplicate_json_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, r#"{"rice": {"name_en": "A"}, "rice": {"name_en": "B"}}"#).unwrap();

        let result = load_catalog(&path);
        assert!(matches!(result, Err(FoodAiError::InvalidCatalog(msg)) if msg.contains("rice")));
    }

    #[test]
    fn test_load_catalog_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "CALORIE_DB = {}").unwrap();

        let result = load_catalog(&path);
        assert!(matches!(result, Err(FoodAiError::InvalidCatalog(msg)) if msg.contains("db.json")));
    }

    #[test]
    fn test_reconcile_images_keeps_image_order() {
        let catalog = Catalog::from_json_str(
            r#"{"cooked_rice": {"name_en": "cooked rice"}, "apple": {"name_en": "Apple"}}"#,
        )
        .unwrap();
        let detections: Vec<ImageDetections> = (0..20)
            .map(|i| ImageDetections {
                file_name: format!("img{:02}.jpg", i),
                items: vec![DetectedFoodItem::new(if i % 2 == 0 { "rice" } else { "apple" }, Some(i as f64))],
            })
            .collect();

        let reports = reconcile_images(&detections, &catalog);
        assert_eq!(reports.len(), 20);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.file_name, format!("img{:02}.jpg", i));
            let expected = if i % 2 == 0 { "cooked_rice" } else { "apple" };
            assert_eq!(report.detected_items[0].key, expected);
            assert_eq!(report.detected_items[0].estimated_grams, i as f64);
        }
    }
}
