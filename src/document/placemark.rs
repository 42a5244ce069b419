use photo_geo_common::Quadrant;
use std::path::Path;

/// 共有マーカースタイルのID
pub const PIN_STYLE: &str = "pin";

/// 地図上のマーカー
#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    /// 表示名（文書全体で一意）
    pub name: String,
    pub description: String,
    pub style_url: String,
    /// 新しく作るマーカーの `lon,lat`（`Point` として書き出す）
    pub coordinates: Option<String>,
    /// 読み込んだKMLのうち扱わない子要素（`Point` を含む）。元のXMLのまま書き戻す
    pub extra: Vec<String>,
    pub quadrant: Quadrant,
}

impl Placemark {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        quadrant: Quadrant,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            style_url: format!("#{}", PIN_STYLE),
            coordinates: Some(format!("{},{}", longitude, latitude)),
            extra: Vec::new(),
            quadrant,
        }
    }
}

/// マーカーの説明文
///
/// `Date Taken: 日時` と（指定時は）ファイルの場所、住所JSONを空行区切りで並べる。
pub fn describe(date_taken: &str, file_location: Option<&Path>, address: &serde_json::Value) -> String {
    let address_json =
        serde_json::to_string_pretty(address).unwrap_or_else(|_| address.to_string());

    match file_location {
        Some(location) => format!(
            "Date Taken: {}\n\n{}\n\n{}\n",
            date_taken,
            location.display(),
            address_json
        ),
        None => format!("Date Taken: {}\n\n{}\n", date_taken, address_json),
    }
}
