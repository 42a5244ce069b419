//! 逆ジオコーディング
//!
//! - `ReverseGeocoder`: 1回分の問い合わせ（HTTP実装は `locationiq`）
//! - `classify_response`: レスポンスJSONを `GeocodeReply` に振り分ける
//! - `resolve`: レート制限中は同じ問い合わせを再試行する

mod locationiq;

pub use locationiq::LocationIqClient;

use crate::error::Result;
use photo_geo_common::AddressFields;
use serde_json::Value;
use std::time::Duration;

const RATE_LIMITED: &str = "Rate Limited Second";
const INVALID_REQUEST: &str = "Invalid Request";

/// 住所つきの応答
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub fields: AddressFields,
    /// `address` オブジェクトそのまま（KMLの説明に使う）
    pub address: Value,
    /// レスポンス全体（詳細ログ用）
    pub response: Value,
}

/// ジオコーダの応答の種類
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeReply {
    Address(GeocodedAddress),
    RateLimited,
    InvalidCoordinates,
    UnexpectedResponse(String),
}

/// レスポンスJSONを振り分ける
pub fn classify_response(response: Value) -> GeocodeReply {
    if let Some(error) = response.get("error") {
        return match error.as_str() {
            Some(RATE_LIMITED) => GeocodeReply::RateLimited,
            Some(INVALID_REQUEST) => GeocodeReply::InvalidCoordinates,
            Some(other) => GeocodeReply::UnexpectedResponse(other.to_string()),
            None => GeocodeReply::UnexpectedResponse(error.to_string()),
        };
    }

    let Some(address) = response.get("address").filter(|a| a.is_object()).cloned() else {
        return GeocodeReply::UnexpectedResponse("addressがありません".into());
    };

    match serde_json::from_value::<AddressFields>(address.clone()) {
        Ok(fields) => GeocodeReply::Address(GeocodedAddress {
            fields,
            address,
            response,
        }),
        Err(e) => GeocodeReply::UnexpectedResponse(format!("addressの形式が不正: {}", e)),
    }
}

/// 逆ジオコーディングの1回分の問い合わせ
///
/// 通信エラーは `Err`、サービスが返した内容は `GeocodeReply` で返す。
#[allow(async_fn_in_trait)]
pub trait ReverseGeocoder {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<GeocodeReply>;
}

/// レート制限時の再試行設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// None なら制限が解けるまで続ける
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

/// レート制限が解けるまで問い合わせる
///
/// 戻り値が `RateLimited` になるのは `max_attempts` を使い切ったときだけ。
/// 通信エラーは `UnexpectedResponse` にまとめる。
pub async fn resolve<G>(geocoder: &G, lat: f64, lon: f64, policy: &RetryPolicy) -> GeocodeReply
where
    G: ReverseGeocoder,
{
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);

        let reply = match geocoder.reverse(lat, lon).await {
            Ok(reply) => reply,
            Err(e) => GeocodeReply::UnexpectedResponse(e.to_string()),
        };

        if !matches!(reply, GeocodeReply::RateLimited) {
            return reply;
        }

        if policy.max_attempts.is_some_and(|max| attempt >= max) {
            tracing::warn!(attempt, "レート制限が解除されませんでした");
            return GeocodeReply::RateLimited;
        }

        tracing::info!(attempt, "レート制限中... {:?}後に再試行", policy.delay);
        tokio::time::sleep(policy.delay).await;
    }
}
