//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use photo_geo_rust::error::PhotoGeoError;
use photo_geo_rust::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, PhotoGeoError::FolderNotFound(_)));
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("photo.png"), "png").unwrap();

    let result = scanner::scan_folder(dir.path());
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// PhotoGeoErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PhotoGeoError::Config("テスト設定エラー".to_string()),
        PhotoGeoError::FolderNotFound("/path/to/folder".to_string()),
        PhotoGeoError::ExifRead("no exif".to_string()),
        PhotoGeoError::MissingGpsData("a.jpg".to_string()),
        PhotoGeoError::InvalidCoordinates { lat: 91.0, lon: 0.0 },
        PhotoGeoError::UnexpectedResponse("Unable to geocode".to_string()),
        PhotoGeoError::MalformedDocument("Document要素がありません".to_string()),
        PhotoGeoError::FileMove("a.jpg".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 座標エラーのメッセージに座標が含まれる
#[test]
fn test_invalid_coordinates_message() {
    let err = PhotoGeoError::InvalidCoordinates { lat: 91.5, lon: -200.25 };
    assert!(format!("{}", err).contains("91.5,-200.25"));
}

/// 想定外のレスポンスは内容をそのまま表示する
#[test]
fn test_unexpected_response_message() {
    let err = PhotoGeoError::UnexpectedResponse("Rate Limited Day".into());
    let display = format!("{}", err);

    assert!(display.contains("想定外"));
    assert!(display.contains("Rate Limited Day"));
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let err = PhotoGeoError::MissingApiKey;
    let display = format!("{}", err);

    assert!(display.contains("APIキー"));
    assert!(display.contains("photo-geo config"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: PhotoGeoError = io_err.into();

    assert!(matches!(err, PhotoGeoError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: PhotoGeoError = json_err.into();

    assert!(matches!(err, PhotoGeoError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = photo_geo_common::Error::InvalidRational("1/0".to_string());
    let err: PhotoGeoError = common_err.into();

    assert!(matches!(err, PhotoGeoError::Common(_)));
    assert!(format!("{}", err).contains("1/0"));
}
