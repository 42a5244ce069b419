//! GPS座標の変換
//!
//! EXIFのGPSタグ（度・分・秒の有理数 + 半球記号）を符号付きの10進度に変換し、
//! 半球記号の組み合わせから象限（NW/NE/SW/SE）を決める。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// EXIFの有理数（分子/分母）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub num: u32,
    pub denom: u32,
}

impl Rational {
    pub const fn new(num: u32, denom: u32) -> Self {
        Self { num, denom }
    }

    /// 分母0は未定義なのでエラーにする
    pub fn to_f64(self) -> Result<f64> {
        if self.denom == 0 {
            return Err(Error::InvalidRational(format!("{}/{}", self.num, self.denom)));
        }
        Ok(self.num as f64 / self.denom as f64)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.denom)
    }
}

/// 半球記号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// 南半球・西半球は負
    pub fn is_negative(self) -> bool {
        matches!(self, Hemisphere::South | Hemisphere::West)
    }

    pub fn is_latitude(self) -> bool {
        matches!(self, Hemisphere::North | Hemisphere::South)
    }

    pub fn as_char(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }
}

impl std::str::FromStr for Hemisphere {
    type Err = Error;

    /// EXIFのASCII値は末尾にNULや空白が付くことがあるので先頭文字だけを見る
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('N') => Ok(Hemisphere::North),
            Some('S') => Ok(Hemisphere::South),
            Some('E') => Ok(Hemisphere::East),
            Some('W') => Ok(Hemisphere::West),
            _ => Err(Error::InvalidHemisphere(s.to_string())),
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 度・分・秒を10進度に変換する
///
/// `d + m/60 + s/3600`、南(S)・西(W)なら符号を反転する。
/// 分母が0の有理数は `Error::InvalidRational`。
pub fn to_decimal_degrees(
    degrees: Rational,
    minutes: Rational,
    seconds: Rational,
    hemisphere: Hemisphere,
) -> Result<f64> {
    let d = degrees.to_f64()?;
    let m = minutes.to_f64()?;
    let s = seconds.to_f64()?;
    let value = d + m / 60.0 + s / 3600.0;

    if hemisphere.is_negative() {
        Ok(-value)
    } else {
        Ok(value)
    }
}

/// EXIFから読み取った1軸分のGPS値
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsReading {
    pub degrees: Rational,
    pub minutes: Rational,
    pub seconds: Rational,
    pub hemisphere: Hemisphere,
}

impl GpsReading {
    pub fn to_decimal(&self) -> Result<f64> {
        to_decimal_degrees(self.degrees, self.minutes, self.seconds, self.hemisphere)
    }
}

/// 象限（KMLのフォルダ分け単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quadrant {
    NW,
    NE,
    SW,
    SE,
}

impl Quadrant {
    /// 文書内でのフォルダ順
    pub const ALL: [Quadrant; 4] = [Quadrant::NW, Quadrant::NE, Quadrant::SW, Quadrant::SE];

    /// 半球記号の組み合わせから象限を決める
    ///
    /// 赤道・本初子午線上の座標も記号どおりに振り分ける（専用の象限は持たない）。
    pub fn from_hemispheres(latitude: Hemisphere, longitude: Hemisphere) -> Result<Self> {
        match (latitude, longitude) {
            (Hemisphere::North, Hemisphere::West) => Ok(Quadrant::NW),
            (Hemisphere::North, Hemisphere::East) => Ok(Quadrant::NE),
            (Hemisphere::South, Hemisphere::West) => Ok(Quadrant::SW),
            (Hemisphere::South, Hemisphere::East) => Ok(Quadrant::SE),
            (lat, lon) => Err(Error::HemisphereMismatch(format!(
                "latitude={}, longitude={}",
                lat, lon
            ))),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Quadrant::NW => "NW",
            Quadrant::NE => "NE",
            Quadrant::SW => "SW",
            Quadrant::SE => "SE",
        }
    }

    /// KMLフォルダの表示名
    pub fn label(self) -> &'static str {
        match self {
            Quadrant::NW => "Northwest",
            Quadrant::NE => "Northeast",
            Quadrant::SW => "Southwest",
            Quadrant::SE => "Southeast",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Quadrant::NW => 0,
            Quadrant::NE => 1,
            Quadrant::SW => 2,
            Quadrant::SE => 3,
        }
    }
}

impl std::str::FromStr for Quadrant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "NW" => Ok(Quadrant::NW),
            "NE" => Ok(Quadrant::NE),
            "SW" => Ok(Quadrant::SW),
            "SE" => Ok(Quadrant::SE),
            other => Err(Error::HemisphereMismatch(format!("unknown quadrant: {}", other))),
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whole(n: u32) -> Rational {
        Rational::new(n, 1)
    }

    #[test]
    fn test_north_is_positive() {
        let value =
            to_decimal_degrees(whole(40), whole(44), Rational::new(5436, 100), Hemisphere::North)
                .unwrap();
        assert!((value - 40.7484).abs() < 1e-4);
    }

    #[test]
    fn test_south_is_negative() {
        let value =
            to_decimal_degrees(whole(40), whole(44), Rational::new(5436, 100), Hemisphere::South)
                .unwrap();
        assert!((value + 40.7484).abs() < 1e-4);
    }

    #[test]
    fn test_west_is_negative() {
        let value = to_decimal_degrees(whole(73), whole(59), whole(0), Hemisphere::West).unwrap();
        assert!(value < 0.0);
        assert!((value + 73.98333).abs() < 1e-4);
    }

    #[test]
    fn test_zero_denominator_is_error() {
        let result = to_decimal_degrees(whole(10), Rational::new(3, 0), whole(0), Hemisphere::East);
        assert_eq!(result, Err(Error::InvalidRational("3/0".to_string())));
    }

    #[test]
    fn test_hemisphere_parse() {
        assert_eq!("N".parse::<Hemisphere>().unwrap(), Hemisphere::North);
        assert_eq!("s".parse::<Hemisphere>().unwrap(), Hemisphere::South);
        assert_eq!("W\0".parse::<Hemisphere>().unwrap(), Hemisphere::West);
        assert!("".parse::<Hemisphere>().is_err());
        assert!("Q".parse::<Hemisphere>().is_err());
    }

    #[test]
    fn test_quadrant_from_hemispheres() {
        use Hemisphere::*;
        assert_eq!(Quadrant::from_hemispheres(North, West).unwrap(), Quadrant::NW);
        assert_eq!(Quadrant::from_hemispheres(North, East).unwrap(), Quadrant::NE);
        assert_eq!(Quadrant::from_hemispheres(South, West).unwrap(), Quadrant::SW);
        assert_eq!(Quadrant::from_hemispheres(South, East).unwrap(), Quadrant::SE);
        assert!(Quadrant::from_hemispheres(East, North).is_err());
        assert!(Quadrant::from_hemispheres(North, South).is_err());
    }

    #[test]
    fn test_equator_follows_reference() {
        // 緯度0でも記号がSならSW/SE
        let reading = GpsReading {
            degrees: whole(0),
            minutes: whole(0),
            seconds: whole(0),
            hemisphere: Hemisphere::South,
        };
        assert_eq!(reading.to_decimal().unwrap(), 0.0);
        let quadrant = Quadrant::from_hemispheres(reading.hemisphere, Hemisphere::East).unwrap();
        assert_eq!(quadrant, Quadrant::SE);
    }

    #[test]
    fn test_quadrant_round_trip_code() {
        for quadrant in Quadrant::ALL {
            assert_eq!(quadrant.code().parse::<Quadrant>().unwrap(), quadrant);
        }
        assert_eq!(Quadrant::NE.index(), 1);
        assert_eq!(Quadrant::SW.label(), "Southwest");
    }
}
