use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoodAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。環境変数 OPENAI_API_KEY を設定するか `food-photo config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("対応していないファイル形式です: {0}")]
    UnsupportedFile(String),

    #[error("ファイルサイズが上限を超えています: {path} ({size} bytes > {limit} bytes)")]
    FileTooLarge { path: String, size: u64, limit: u64 },

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("カタログファイルが不正: {0}")]
    InvalidCatalog(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error(transparent)]
    Common(#[from] food_photo_common::Error),
}

pub type Result<T> = std::result::Result<T, FoodAiError>;
