use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoGeoError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`--key`、環境変数 LOCATIONIQ_API_KEY、または `photo-geo config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("EXIF読み込みエラー: {0}")]
    ExifRead(String),

    #[error("GPS情報がありません: {0}")]
    MissingGpsData(String),

    #[error("座標が不正です: {lat},{lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("想定外のAPIレスポンス: {0}")]
    UnexpectedResponse(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("KMLファイルが不正: {0}")]
    MalformedDocument(String),

    #[error("ファイル移動エラー: {0}")]
    FileMove(String),

    #[error(transparent)]
    Common(#[from] photo_geo_common::Error),
}

pub type Result<T> = std::result::Result<T, PhotoGeoError>;
