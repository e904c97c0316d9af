//! 포트폴리오 재구성 통합 테스트.
//!
//! 인메모리 Provider로 재구성 알고리즘 전체(매수일 반영, 부분 실패 흡수,
//! 취소, 세대 보호)를 검증합니다.

use std::collections::{HashMap, HashSet};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use journal_core::{AssetLot, PortfolioConfig, PricePoint};
use journal_portfolio::{
    PortfolioError, PortfolioReconstructor, PriceHistoryProvider, ProviderError,
    ReconstructionGate, Resolution,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

/// 테스트용 인메모리 가격 Provider
#[derive(Default)]
struct StaticProvider {
    series: HashMap<String, Vec<PricePoint>>,
    spots: HashMap<String, Decimal>,
    failing: HashSet<String>,
    delay: Option<StdDuration>,
}

impl StaticProvider {
    fn with_flat_series(
        mut self,
        asset_id: &str,
        start: DateTime<Utc>,
        days: i64,
        price: Decimal,
    ) -> Self {
        let points = (0..=days)
            .map(|d| PricePoint::new(start + Duration::days(d), price))
            .collect();
        self.series.insert(asset_id.to_string(), points);
        self
    }

    fn with_spot(mut self, asset_id: &str, price: Decimal) -> Self {
        self.spots.insert(asset_id.to_string(), price);
        self
    }

    fn with_failure(mut self, asset_id: &str) -> Self {
        self.failing.insert(asset_id.to_string());
        self
    }

    fn with_delay(mut self, delay: StdDuration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl PriceHistoryProvider for StaticProvider {
    async fn price_series(
        &self,
        asset_id: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _resolution: Resolution,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(asset_id) {
            return Err(ProviderError::NotFound {
                asset_id: asset_id.to_string(),
            });
        }
        Ok(self.series.get(asset_id).cloned().unwrap_or_default())
    }

    async fn spot_price(&self, asset_id: &str) -> Result<PricePoint, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.spots
            .get(asset_id)
            .map(|price| PricePoint::new(Utc::now(), *price))
            .ok_or_else(|| ProviderError::NotFound {
                asset_id: asset_id.to_string(),
            })
    }
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn test_staggered_purchases_step_the_curve() {
    // 명세 검증 벡터: 같은 자산 두 lot, 매수일 10일 차이, $1 고정 가격
    let now = fixed_now();
    let start = now - Duration::days(30);
    let provider = StaticProvider::default().with_flat_series("bitcoin", start, 30, dec!(1));

    let lots = vec![
        AssetLot::new("BTC", "bitcoin", dec!(1))
            .with_purchase(dec!(1), now - Duration::days(25)),
        AssetLot::new("BTC", "bitcoin", dec!(1))
            .with_purchase(dec!(1), now - Duration::days(15)),
    ];

    let reconstructor = PortfolioReconstructor::new(provider);
    let cancel = CancellationToken::new();
    let history = reconstructor
        .reconstruct_at(&lots, 30, now, &cancel)
        .await
        .unwrap();

    assert!(!history.is_degraded());
    assert!(!history.points.is_empty());

    // 첫 매수 전 구간(전체 lot 미보유)은 제거됨
    assert!(history.points.len() < 100);
    assert_eq!(history.points.first().unwrap().value, dec!(1));

    // 두 번째 매수 전에는 1, 후에는 2
    let second_purchase = now - Duration::days(15);
    for point in &history.points {
        let expected = if point.timestamp < second_purchase {
            dec!(1)
        } else {
            dec!(2)
        };
        assert_eq!(point.value, expected, "at {}", point.timestamp);
    }
    assert_eq!(history.points.last().unwrap().value, dec!(2));
}

#[tokio::test]
async fn test_full_window_lots_fill_all_samples() {
    let now = fixed_now();
    let start = now - Duration::days(30);
    let provider = StaticProvider::default().with_flat_series("bitcoin", start, 30, dec!(100));

    let lots = vec![AssetLot::new("BTC", "bitcoin", dec!(2)).with_purchase(dec!(90), start)];

    let reconstructor = PortfolioReconstructor::new(provider);
    let cancel = CancellationToken::new();
    let history = reconstructor
        .reconstruct_at(&lots, 30, now, &cancel)
        .await
        .unwrap();

    // 처음부터 보유 → 샘플 수는 설정 기본값 그대로
    assert_eq!(history.points.len(), 100);
    assert!(history.points.iter().all(|p| p.value == dec!(200)));

    // 타임스탬프 단조 증가, 마지막 샘플은 now
    for pair in history.points.windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
    assert_eq!(history.points.last().unwrap().timestamp, now);
}

#[tokio::test]
async fn test_failed_asset_degrades_but_does_not_abort() {
    // 명세: 자산 하나의 조회 실패는 전체 요청을 실패시키지 않음
    let now = fixed_now();
    let start = now - Duration::days(30);
    let provider = StaticProvider::default()
        .with_flat_series("bitcoin", start, 30, dec!(1))
        .with_failure("brokenium");

    let lots = vec![
        AssetLot::new("BTC", "bitcoin", dec!(2)).with_purchase(dec!(1), start),
        AssetLot::new("BRK", "brokenium", dec!(10)).with_purchase(dec!(5), start),
    ];

    let reconstructor = PortfolioReconstructor::new(provider);
    let cancel = CancellationToken::new();
    let history = reconstructor
        .reconstruct_at(&lots, 30, now, &cancel)
        .await
        .unwrap();

    // 실패 자산은 모든 샘플에 0으로 기여
    assert_eq!(history.points.len(), 100);
    assert!(history.points.iter().all(|p| p.value == dec!(2)));

    // 실패 자산이 missing 목록에 보고됨
    assert!(history.is_degraded());
    assert_eq!(history.missing_assets.len(), 1);
    assert_eq!(history.missing_assets[0].asset_id, "brokenium");
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetch_times_out_and_is_absorbed() {
    let now = fixed_now();
    let provider = StaticProvider::default().with_delay(StdDuration::from_secs(3600));

    let lots =
        vec![AssetLot::new("BTC", "bitcoin", dec!(1)).with_purchase(dec!(1), now - Duration::days(30))];

    let reconstructor = PortfolioReconstructor::new(provider);
    let cancel = CancellationToken::new();
    let history = reconstructor
        .reconstruct_at(&lots, 30, now, &cancel)
        .await
        .unwrap();

    // 타임아웃도 자산별 실패로 흡수됨
    assert_eq!(history.missing_assets.len(), 1);
    assert!(history.missing_assets[0].error.contains("timed out"));
}

#[tokio::test]
async fn test_undated_lot_spans_window_and_flags_degraded() {
    let now = fixed_now();
    let start = now - Duration::days(30);
    let provider = StaticProvider::default().with_flat_series("ethereum", start, 30, dec!(10));

    // 매수일 없는 lot → 전체 윈도우 보유로 간주
    let lots = vec![AssetLot::new("ETH", "ethereum", dec!(3))];

    let reconstructor = PortfolioReconstructor::new(provider);
    let cancel = CancellationToken::new();
    let history = reconstructor
        .reconstruct_at(&lots, 30, now, &cancel)
        .await
        .unwrap();

    assert_eq!(history.points.len(), 100);
    assert!(history.points.iter().all(|p| p.value == dec!(30)));

    assert!(history.is_degraded());
    assert_eq!(history.undated_lots, vec!["ETH".to_string()]);
    assert!(history.missing_assets.is_empty());
}

#[tokio::test]
async fn test_cancelled_before_start_returns_cancelled() {
    let provider = StaticProvider::default();
    let reconstructor = PortfolioReconstructor::new(provider);

    let lots = vec![AssetLot::new("BTC", "bitcoin", dec!(1))];
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = reconstructor
        .reconstruct_at(&lots, 30, fixed_now(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, PortfolioError::Cancelled));
}

#[tokio::test]
async fn test_superseded_generation_cannot_commit() {
    // 명세: 이전 세대의 재구성이 최신 결과를 덮어쓰면 안 됨
    let now = fixed_now();
    let start = now - Duration::days(30);
    let provider = StaticProvider::default().with_flat_series("bitcoin", start, 30, dec!(1));
    let reconstructor = PortfolioReconstructor::new(provider);
    let gate = ReconstructionGate::new();

    let lots = vec![AssetLot::new("BTC", "bitcoin", dec!(1)).with_purchase(dec!(1), start)];

    // 첫 요청 시작 후, 완료 전에 새 요청이 시작된 상황
    let first = gate.begin();
    let second = gate.begin();

    // 이전 세대는 취소되어 결과 없이 종료됨
    let err = reconstructor
        .reconstruct_at(&lots, 30, now, first.cancel_token())
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::Cancelled));
    assert!(!gate.is_current(&first));

    // 최신 세대는 정상 완료되고 커밋 가능
    let history = reconstructor
        .reconstruct_at(&lots, 30, now, second.cancel_token())
        .await
        .unwrap();
    assert!(gate.is_current(&second));
    assert_eq!(history.points.len(), 100);
}

#[tokio::test]
async fn test_invalid_input_is_hard_failure() {
    let provider = StaticProvider::default();
    let reconstructor = PortfolioReconstructor::new(provider);
    let cancel = CancellationToken::new();

    // 윈도우 0일
    let err = reconstructor
        .reconstruct_at(&[], 0, fixed_now(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidInput(_)));

    // 수량 0 lot
    let bad_lot = vec![AssetLot::new("BTC", "bitcoin", Decimal::ZERO)];
    let err = reconstructor
        .reconstruct_at(&bad_lot, 30, fixed_now(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidInput(_)));
}

#[tokio::test]
async fn test_empty_lots_yield_empty_history() {
    let provider = StaticProvider::default();
    let reconstructor = PortfolioReconstructor::new(provider);
    let cancel = CancellationToken::new();

    let history = reconstructor
        .reconstruct_at(&[], 30, fixed_now(), &cancel)
        .await
        .unwrap();

    assert!(history.points.is_empty());
    assert!(!history.is_degraded());
}

#[tokio::test]
async fn test_custom_sample_points() {
    let now = fixed_now();
    let start = now - Duration::days(7);
    let provider = StaticProvider::default().with_flat_series("bitcoin", start, 7, dec!(5));

    let config = PortfolioConfig {
        sample_points: 24,
        ..Default::default()
    };
    let reconstructor = PortfolioReconstructor::with_config(provider, config);
    let cancel = CancellationToken::new();

    let lots = vec![AssetLot::new("BTC", "bitcoin", dec!(1)).with_purchase(dec!(5), start)];
    let history = reconstructor
        .reconstruct_at(&lots, 7, now, &cancel)
        .await
        .unwrap();

    assert_eq!(history.points.len(), 24);
}

#[tokio::test]
async fn test_snapshot_totals_and_partial_failure() {
    let provider = StaticProvider::default()
        .with_spot("bitcoin", dec!(50000))
        .with_failure("ethereum");

    let lots = vec![
        AssetLot::new("BTC", "bitcoin", dec!(0.5)).with_purchase_price(dec!(40000)),
        AssetLot::new("ETH", "ethereum", dec!(2)).with_purchase_price(dec!(3000)),
    ];

    let reconstructor = PortfolioReconstructor::new(provider);
    let cancel = CancellationToken::new();
    let snapshot = reconstructor.snapshot(&lots, &cancel).await.unwrap();

    // BTC: 가치 25000, 비용 20000, 손익 5000 (25%)
    assert_eq!(snapshot.total_value, dec!(25000));
    assert_eq!(snapshot.total_cost, dec!(20000));
    assert_eq!(snapshot.total_pnl, dec!(5000));
    assert_eq!(snapshot.total_pnl_percent, dec!(25));

    let btc = &snapshot.assets[0];
    assert_eq!(btc.current_value, Some(dec!(25000)));
    assert_eq!(btc.pnl_percent, Some(dec!(25)));
    assert!(btc.error.is_none());

    // 실패 자산은 0 기여 + error 필드
    let eth = &snapshot.assets[1];
    assert_eq!(eth.current_value, None);
    assert!(eth.error.is_some());
    assert!(snapshot.is_degraded());
}
