//! 가격 이력 Provider 모듈.
//!
//! 자산별 과거 가격 시계열과 현재가를 제공하는 외부 협력자 인터페이스를
//! 정의합니다.
//!
//! ## CoinGecko
//! - `CoinGeckoProvider`: CoinGecko 공개 REST API 클라이언트
//! - `market_chart` 가격 이력, `simple/price` 현재가
//! - 인증키 불필요, 분당 요청 한도 존재 (429 처리)

pub mod coingecko;

pub use coingecko::CoinGeckoProvider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use journal_core::PricePoint;

/// 가격 시계열 해상도 힌트.
///
/// 실제 반환 해상도는 Provider가 결정하며, 이 값은 요청 힌트입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// 시간별 포인트
    Hourly,
    /// 일별 포인트
    Daily,
}

impl Resolution {
    /// 윈도우 길이에 따라 해상도를 선택합니다 (2일 이하면 시간별).
    pub fn for_window_days(window_days: u32) -> Self {
        if window_days <= 2 {
            Resolution::Hourly
        } else {
            Resolution::Daily
        }
    }

    /// Provider 질의 파라미터 문자열.
    pub fn as_interval(&self) -> &'static str {
        match self {
            Resolution::Hourly => "hourly",
            Resolution::Daily => "daily",
        }
    }
}

/// 가격 이력 Provider 인터페이스.
///
/// 재구성 엔진이 의존하는 유일한 외부 협력자입니다. 테스트에서는
/// 인메모리 구현으로 대체할 수 있습니다.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// `[start, end]` 범위의 가격 시계열을 반환합니다.
    ///
    /// # Returns
    ///
    /// 타임스탬프 오름차순 시퀀스. 자산에 해당 구간 데이터가 없으면
    /// 빈 시퀀스일 수 있습니다.
    async fn price_series(
        &self,
        asset_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> Result<Vec<PricePoint>, ProviderError>;

    /// 자산의 현재가를 반환합니다.
    async fn spot_price(&self, asset_id: &str) -> Result<PricePoint, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_for_window() {
        assert_eq!(Resolution::for_window_days(1), Resolution::Hourly);
        assert_eq!(Resolution::for_window_days(2), Resolution::Hourly);
        assert_eq!(Resolution::for_window_days(3), Resolution::Daily);
        assert_eq!(Resolution::for_window_days(90), Resolution::Daily);
    }

    #[test]
    fn test_interval_param() {
        assert_eq!(Resolution::Hourly.as_interval(), "hourly");
        assert_eq!(Resolution::Daily.as_interval(), "daily");
    }
}
