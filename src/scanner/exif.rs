use crate::error::{PhotoGeoError, Result};
use chrono::{Datelike, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use photo_geo_common::{GpsReading, Hemisphere, Quadrant, Rational, UNKNOWN};
use std::io::Cursor;

/// 写真から読み取ったタグのうち、処理に使うもの
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoTags {
    pub latitude: Option<GpsReading>,
    pub longitude: Option<GpsReading>,
    /// EXIFの生の日時文字列（"2019:07:04 12:00:00"）
    pub date_taken: Option<String>,
}

/// 10進度の撮影位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub quadrant: Quadrant,
}

impl PhotoTags {
    /// 緯度・経度・それぞれの半球記号がそろっていれば10進度に変換する
    pub fn position(&self) -> Result<Position> {
        let (lat, lon) = match (&self.latitude, &self.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(PhotoGeoError::MissingGpsData("GPSタグが不足".into())),
        };

        let quadrant = Quadrant::from_hemispheres(lat.hemisphere, lon.hemisphere)?;

        Ok(Position {
            latitude: lat.to_decimal()?,
            longitude: lon.to_decimal()?,
            quadrant,
        })
    }

    /// 撮影日時の表示用文字列
    pub fn date_label(&self) -> &str {
        self.date_taken.as_deref().unwrap_or(UNKNOWN)
    }

    /// 撮影年（日時文字列の先頭フィールド）
    pub fn year(&self) -> String {
        let Some(date) = self.date_taken.as_deref() else {
            return UNKNOWN.to_string();
        };

        if let Ok(dt) = NaiveDateTime::parse_from_str(date.trim(), "%Y:%m:%d %H:%M:%S") {
            return dt.year().to_string();
        }

        date.split(':')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    }
}

/// 画像バイト列からタグを読み取る
pub trait TagReader {
    fn read_tags(&self, bytes: &[u8]) -> Result<PhotoTags>;
}

/// kamadak-exif によるタグ読み取り
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifTagReader;

impl TagReader for ExifTagReader {
    fn read_tags(&self, bytes: &[u8]) -> Result<PhotoTags> {
        let mut cursor = Cursor::new(bytes);
        let exif = Reader::new()
            .read_from_container(&mut cursor)
            .map_err(|e| PhotoGeoError::ExifRead(e.to_string()))?;

        let date_taken = ascii_field(&exif, Tag::DateTimeOriginal)
            .or_else(|| ascii_field(&exif, Tag::DateTime));

        Ok(PhotoTags {
            latitude: gps_reading(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef),
            longitude: gps_reading(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef),
            date_taken,
        })
    }
}

fn ascii_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(values) => values
            .first()
            .map(|v| String::from_utf8_lossy(v).trim_matches(char::from(0)).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// 度・分・秒と半球記号を読み取る（形式が違えばタグなしと同じ扱い）
fn gps_reading(exif: &exif::Exif, coord_tag: Tag, ref_tag: Tag) -> Option<GpsReading> {
    let coord_field = exif.get_field(coord_tag, In::PRIMARY)?;
    let hemisphere: Hemisphere = ascii_field(exif, ref_tag)?.parse().ok()?;

    match &coord_field.value {
        Value::Rational(values) if values.len() >= 3 => {
            let to_common = |r: &exif::Rational| Rational::new(r.num, r.denom);
            Some(GpsReading {
                degrees: to_common(&values[0]),
                minutes: to_common(&values[1]),
                seconds: to_common(&values[2]),
                hemisphere,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(d: u32, m: u32, s: (u32, u32), hemisphere: Hemisphere) -> GpsReading {
        GpsReading {
            degrees: Rational::new(d, 1),
            minutes: Rational::new(m, 1),
            seconds: Rational::new(s.0, s.1),
            hemisphere,
        }
    }

    #[test]
    fn test_position_empire_state() {
        let tags = PhotoTags {
            latitude: Some(reading(40, 44, (5436, 100), Hemisphere::North)),
            longitude: Some(reading(73, 59, (864, 100), Hemisphere::West)),
            date_taken: Some("2019:07:04 12:00:00".into()),
        };
        let position = tags.position().unwrap();
        assert!((position.latitude - 40.7484).abs() < 1e-4);
        assert!(position.longitude < -73.98);
        assert_eq!(position.quadrant, Quadrant::NW);
    }

    #[test]
    fn test_position_missing_longitude() {
        let tags = PhotoTags {
            latitude: Some(reading(40, 44, (0, 1), Hemisphere::North)),
            ..Default::default()
        };
        assert!(matches!(tags.position(), Err(PhotoGeoError::MissingGpsData(_))));
    }

    #[test]
    fn test_position_zero_denominator() {
        let tags = PhotoTags {
            latitude: Some(reading(40, 44, (1, 0), Hemisphere::North)),
            longitude: Some(reading(73, 59, (0, 1), Hemisphere::West)),
            date_taken: None,
        };
        assert!(matches!(tags.position(), Err(PhotoGeoError::Common(_))));
    }

    #[test]
    fn test_year() {
        let mut tags = PhotoTags {
            date_taken: Some("2019:07:04 12:00:00".into()),
            ..Default::default()
        };
        assert_eq!(tags.year(), "2019");

        tags.date_taken = Some("2021:13".into());
        assert_eq!(tags.year(), "2021");

        tags.date_taken = None;
        assert_eq!(tags.year(), "Unknown");
        assert_eq!(tags.date_label(), "Unknown");
    }

    #[test]
    fn test_read_tags_not_jpeg() {
        let result = ExifTagReader.read_tags(b"not an image");
        assert!(matches!(result, Err(PhotoGeoError::ExifRead(_))));
    }
}
