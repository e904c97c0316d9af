//! CoinGecko 가격 Provider.
//!
//! CoinGecko 공개 REST API에서 자산별 가격 이력과 현재가를 조회합니다.
//!
//! ## 엔드포인트
//! - `/coins/{id}/market_chart`: 가격 이력 (`[[타임스탬프(ms), 가격]]`)
//! - `/simple/price`: 현재가
//!
//! ## 사용 예시
//! ```rust,ignore
//! let provider = CoinGeckoProvider::new();
//! let series = provider
//!     .price_series("bitcoin", start, end, Resolution::Daily)
//!     .await?;
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::{PriceHistoryProvider, Resolution};
use crate::error::ProviderError;
use journal_core::{PortfolioConfig, PricePoint};

/// CoinGecko 공개 API 기본 URL.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// 요청당 HTTP 타임아웃 (초).
const HTTP_TIMEOUT_SECS: u64 = 30;

/// `market_chart` 응답 본문.
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    /// `[타임스탬프(ms), 가격]` 쌍 목록
    prices: Vec<(i64, f64)>,
}

/// CoinGecko REST 클라이언트.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// 기본 설정으로 생성합니다.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// 커스텀 기본 URL로 생성합니다 (테스트 및 프록시용).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent("journal-portfolio/0.1")
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// 설정에서 Provider를 생성합니다.
    pub fn from_config(config: &PortfolioConfig) -> Self {
        Self::with_base_url(config.provider_base_url.clone())
    }

    /// 상태 코드를 Provider 오류로 변환합니다.
    fn check_status(status: StatusCode, asset_id: &str) -> Result<(), ProviderError> {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound {
                asset_id: asset_id.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceHistoryProvider for CoinGeckoProvider {
    async fn price_series(
        &self,
        asset_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let days = (end - start).num_days().max(1);
        let url = format!("{}/coins/{}/market_chart", self.base_url, asset_id);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("days", &days.to_string()),
                ("interval", resolution.as_interval()),
            ])
            .send()
            .await?;

        Self::check_status(response.status(), asset_id)?;
        let body = response.error_for_status()?.text().await?;

        let chart: MarketChartResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        let mut points = Vec::with_capacity(chart.prices.len());
        for (ts_millis, price) in chart.prices {
            let timestamp = Utc
                .timestamp_millis_opt(ts_millis)
                .single()
                .ok_or_else(|| ProviderError::Parse(format!("invalid timestamp: {}", ts_millis)))?;
            let price = Decimal::from_f64(price)
                .ok_or_else(|| ProviderError::Parse(format!("invalid price: {}", price)))?;

            points.push(PricePoint::new(timestamp, price));
        }
        points.sort_by_key(|p| p.timestamp);

        debug!(asset_id, points = points.len(), "Fetched price series");
        Ok(points)
    }

    async fn spot_price(&self, asset_id: &str) -> Result<PricePoint, ProviderError> {
        let url = format!("{}/simple/price", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("ids", asset_id), ("vs_currencies", "usd")])
            .send()
            .await?;

        Self::check_status(response.status(), asset_id)?;
        let body = response.error_for_status()?.text().await?;

        // 응답 형식: {"bitcoin": {"usd": 64250.12}}
        let parsed: HashMap<String, HashMap<String, f64>> =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        let raw = parsed
            .get(asset_id)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .ok_or_else(|| ProviderError::NotFound {
                asset_id: asset_id.to_string(),
            })?;

        let price = Decimal::from_f64(raw)
            .ok_or_else(|| ProviderError::Parse(format!("invalid price: {}", raw)))?;

        Ok(PricePoint::new(Utc::now(), price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use rust_decimal_macros::dec;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let end = Utc::now();
        (end - ChronoDuration::days(7), end)
    }

    #[tokio::test]
    async fn test_market_chart_parsing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/bitcoin/market_chart")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"prices": [[1700086400000, 51000.0], [1700000000000, 50000.5]]}"#)
            .create_async()
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.url());
        let (start, end) = window();
        let series = provider
            .price_series("bitcoin", start, end, Resolution::Daily)
            .await
            .unwrap();

        // 역순 입력도 오름차순으로 정렬됨
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].price, dec!(50000.5));
        assert!(series[0].timestamp < series[1].timestamp);
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/bitcoin/market_chart")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.url());
        let (start, end) = window();
        let err = provider
            .price_series("bitcoin", start, end, Resolution::Daily)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn test_unknown_asset_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/doesnotexist/market_chart")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.url());
        let (start, end) = window();
        let err = provider
            .price_series("doesnotexist", start, end, Resolution::Daily)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/bitcoin/market_chart")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.url());
        let (start, end) = window();
        let err = provider
            .price_series("bitcoin", start, end, Resolution::Daily)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_spot_price() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/simple/price")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"bitcoin": {"usd": 64250.5}}"#)
            .create_async()
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.url());
        let point = provider.spot_price("bitcoin").await.unwrap();

        assert_eq!(point.price, dec!(64250.5));
    }

    #[tokio::test]
    async fn test_spot_price_missing_asset() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/simple/price")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.url());
        let err = provider.spot_price("bitcoin").await.unwrap_err();

        assert!(matches!(err, ProviderError::NotFound { .. }));
    }
}
