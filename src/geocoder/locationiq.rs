//! LocationIQ 逆ジオコーディングAPI

use super::{classify_response, GeocodeReply, ReverseGeocoder};
use crate::config::Config;
use crate::error::{PhotoGeoError, Result};
use std::time::Duration;

const USER_AGENT: &str = concat!("photo-geo-rust/", env!("CARGO_PKG_VERSION"));

pub struct LocationIqClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl LocationIqClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PhotoGeoError::ApiCall(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config, api_key: impl Into<String>) -> Result<Self> {
        Self::new(config.endpoint.clone(), api_key, config.timeout())
    }

    fn query(&self, lat: f64, lon: f64) -> Vec<(&'static str, String)> {
        vec![
            ("format", "json".to_string()),
            ("normalizecity", "1".to_string()),
            ("normalizeaddress", "1".to_string()),
            ("key", self.api_key.clone()),
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
        ]
    }
}

impl ReverseGeocoder for LocationIqClient {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<GeocodeReply> {
        tracing::debug!(lat, lon, endpoint = %self.endpoint, "逆ジオコーディング問い合わせ");

        // エラー時もJSON本文（{"error": ...}）が返るのでステータスでは判定しない
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&self.query(lat, lon))
            .send()
            .await
            .map_err(|e| PhotoGeoError::ApiCall(e.to_string()))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PhotoGeoError::ApiParse(format!("HTTP {}: {}", status.as_u16(), e)))?;

        Ok(classify_response(body))
    }
}
