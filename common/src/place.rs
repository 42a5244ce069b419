//! 住所の正規化
//!
//! 逆ジオコーディングの住所レコードから、表示名とフォルダ構成に使う
//! `(地域ラベル, 上位ラベル, POI)` を決める。

use serde::{Deserialize, Serialize};

/// 不明な地名に使うラベル
pub const UNKNOWN: &str = "Unknown";

const USA: &str = "United States of America";
const UK: &str = "United Kingdom";

/// 米国の写真を置くトップフォルダ名
const USA_FOLDER: &str = "United States";

/// ジオコーダが返す住所フィールド（使うものだけ）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressFields {
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub name: Option<String>,
}

impl AddressFields {
    fn field(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn country(&self) -> Option<&str> {
        Self::field(&self.country)
    }

    pub fn city(&self) -> Option<&str> {
        Self::field(&self.city)
    }

    pub fn state(&self) -> Option<&str> {
        Self::field(&self.state)
    }

    pub fn name(&self) -> Option<&str> {
        Self::field(&self.name)
    }
}

/// 正規化された撮影地
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceIdentity {
    /// 市区町村、なければ州相当、どちらもなければ "Unknown"
    pub locality: String,
    /// 米英は州、それ以外は国
    pub region: String,
    /// POI名（なければ空）
    pub poi: String,
    /// 撮影年
    pub year: String,
    /// 元の国名
    pub country: String,
}

/// 住所フィールドを正規化する
///
/// 空文字列のフィールドは欠落として扱う。
pub fn normalize(address: &AddressFields, year: &str) -> PlaceIdentity {
    let country = address.country().unwrap_or_default();

    let (locality, region) = if country == USA || country == UK {
        (
            address.city().unwrap_or(UNKNOWN),
            address.state().unwrap_or(UNKNOWN),
        )
    } else {
        // 都市国家は city/state に国名がそのまま入る（"Vatican City, Vatican City" を避ける）
        let locality = address
            .city()
            .filter(|city| *city != country)
            .or_else(|| address.state().filter(|state| *state != country))
            .unwrap_or(UNKNOWN);
        let region = if country.is_empty() { UNKNOWN } else { country };
        (locality, region)
    };

    PlaceIdentity {
        locality: locality.to_string(),
        region: region.to_string(),
        poi: address.name().unwrap_or_default().to_string(),
        year: year.to_string(),
        country: country.to_string(),
    }
}

impl PlaceIdentity {
    pub fn has_poi(&self) -> bool {
        !self.poi.is_empty()
    }

    /// 地図上の表示名 `(POI) 地域, 上位 - 年`
    pub fn display_name(&self) -> String {
        if self.has_poi() {
            format!("({}) {}, {} - {}", self.poi, self.locality, self.region, self.year)
        } else {
            format!("{}, {} - {}", self.locality, self.region, self.year)
        }
    }

    /// 移動先のフォルダ階層
    ///
    /// 米国は `United States/州/市`、それ以外は `上位/地域`。
    pub fn destination_segments(&self) -> Vec<&str> {
        if self.country == USA {
            vec![USA_FOLDER, self.region.as_str(), self.locality.as_str()]
        } else {
            vec![self.region.as_str(), self.locality.as_str()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(country: &str, city: Option<&str>, state: Option<&str>, name: Option<&str>) -> AddressFields {
        AddressFields {
            country: Some(country.to_string()),
            city: city.map(String::from),
            state: state.map(String::from),
            name: name.map(String::from),
        }
    }

    #[test]
    fn test_normalize_usa() {
        let place = normalize(
            &address("United States of America", Some("Springfield"), Some("Illinois"), None),
            "2019",
        );
        assert_eq!(place.locality, "Springfield");
        assert_eq!(place.region, "Illinois");
        assert_eq!(place.poi, "");
    }

    #[test]
    fn test_normalize_uk_missing_fields() {
        let place = normalize(&address("United Kingdom", None, None, None), "2019");
        assert_eq!(place.locality, UNKNOWN);
        assert_eq!(place.region, UNKNOWN);
    }

    #[test]
    fn test_normalize_city_state() {
        let place = normalize(&address("Vatican City", Some("Vatican City"), None, None), "2020");
        assert_eq!(place.locality, UNKNOWN);
        assert_eq!(place.region, "Vatican City");
        assert_eq!(place.poi, "");
    }

    #[test]
    fn test_normalize_falls_back_to_state() {
        let place = normalize(&address("Japan", None, Some("Hokkaido"), None), "2021");
        assert_eq!(place.locality, "Hokkaido");
        assert_eq!(place.region, "Japan");

        let place = normalize(&address("Monaco", Some("Monaco"), Some("Monaco"), None), "2021");
        assert_eq!(place.locality, UNKNOWN);
    }

    #[test]
    fn test_normalize_blank_city_is_missing() {
        let place = normalize(&address("France", Some("  "), Some("Normandy"), None), "2018");
        assert_eq!(place.locality, "Normandy");
    }

    #[test]
    fn test_normalize_missing_country() {
        let place = normalize(&AddressFields::default(), "2018");
        assert_eq!(place.locality, UNKNOWN);
        assert_eq!(place.region, UNKNOWN);
    }

    #[test]
    fn test_display_name() {
        let place = normalize(
            &address("France", Some("Paris"), Some("Ile-de-France"), Some("Eiffel Tower")),
            "2017",
        );
        assert_eq!(place.display_name(), "(Eiffel Tower) Paris, France - 2017");

        let place = normalize(&address("France", Some("Paris"), None, None), "2017");
        assert_eq!(place.display_name(), "Paris, France - 2017");
    }

    #[test]
    fn test_destination_segments() {
        let place = normalize(
            &address("United States of America", Some("Austin"), Some("Texas"), None),
            "2022",
        );
        assert_eq!(place.destination_segments(), vec!["United States", "Texas", "Austin"]);

        let place = normalize(&address("Italy", Some("Rome"), Some("Lazio"), None), "2022");
        assert_eq!(place.destination_segments(), vec!["Italy", "Rome"]);
    }

    #[test]
    fn test_address_deserialize_ignores_extra_fields() {
        let json = r#"{"country":"Italy","city":"Rome","postcode":"00100","country_code":"it"}"#;
        let fields: AddressFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.city(), Some("Rome"));
        assert_eq!(fields.state(), None);
    }
}
