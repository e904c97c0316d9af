//! 포트폴리오 가치 곡선 재구성.
//!
//! 자산 보유분(lot) 목록과 조회 윈도우로부터 시간순 포트폴리오 가치
//! 곡선을 만듭니다:
//!
//! 1. 서로 다른 자산별로 가격 시계열을 동시 조회 (동시성 상한 적용,
//!    자산별 개별 타임아웃)
//! 2. 윈도우를 고정 개수의 균일 샘플로 분할
//! 3. 샘플 시점마다 각 lot의 기여분 합산 (매수일 이전 lot은 0)
//! 4. 자산별 조회 실패는 흡수하고 결과 메타데이터로 보고
//!
//! 재구성기는 요청 간 상태를 갖지 않습니다. 동일한 `(lots, window, now)`
//! 입력은 (Provider 데이터가 같다면) 동일한 출력을 냅니다. 결과 캐싱은
//! 호출자의 몫입니다.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{PortfolioError, ProviderError};
use crate::provider::{PriceHistoryProvider, Resolution};
use crate::sampling::{price_at, sample_grid};
use journal_core::{AssetLot, PortfolioConfig, PricePoint};

/// 포트폴리오 가치 곡선의 한 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    /// 샘플 시각 (UTC)
    pub timestamp: DateTime<Utc>,
    /// 포트폴리오 총 가치 (USD)
    pub value: Decimal,
}

/// 조회에 실패해 0으로 평가된 자산.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingAsset {
    /// 자산 식별자
    pub asset_id: String,
    /// 실패 사유 (사용자 경고 표시용)
    pub error: String,
}

/// 재구성된 포트폴리오 가치 이력.
///
/// 요청마다 전체 재계산되는 값 객체입니다 (증분/스트리밍 모드 없음).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioHistory {
    /// 가치 곡선 (타임스탬프 오름차순, 최대 `sample_points`개)
    pub points: Vec<ValuePoint>,

    /// 가격 조회에 실패한 자산 목록 (각 샘플에 0으로 기여)
    pub missing_assets: Vec<MissingAsset>,

    /// 매수일 없이 전체 윈도우 보유로 간주된 lot의 심볼 목록
    pub undated_lots: Vec<String>,
}

impl PortfolioHistory {
    /// 결과가 불완전(정확도 저하)한지 여부.
    ///
    /// 조회 실패 자산이 있거나 매수일 미상 lot이 있으면 true.
    /// 호출자는 이 경우 결과를 완전한 것처럼 표시하면 안 됩니다.
    pub fn is_degraded(&self) -> bool {
        !self.missing_assets.is_empty() || !self.undated_lots.is_empty()
    }
}

/// 자산별 조회 결과.
enum FetchOutcome {
    Series(Vec<PricePoint>),
    Failed(String),
    Cancelled,
}

/// 포트폴리오 가치 재구성기.
///
/// 가격 이력 Provider에만 의존하며, 요청 간 공유 가변 상태가 없습니다.
pub struct PortfolioReconstructor<P> {
    provider: P,
    config: PortfolioConfig,
}

impl<P: PriceHistoryProvider> PortfolioReconstructor<P> {
    /// 기본 설정으로 생성합니다.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, PortfolioConfig::default())
    }

    /// 커스텀 설정으로 생성합니다.
    pub fn with_config(provider: P, config: PortfolioConfig) -> Self {
        Self { provider, config }
    }

    /// 설정을 반환합니다.
    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    pub(crate) fn provider_ref(&self) -> &P {
        &self.provider
    }

    /// 현재 시각 기준으로 가치 이력을 재구성합니다.
    ///
    /// # Arguments
    ///
    /// * `lots` - 자산 보유분 목록
    /// * `window_days` - 조회 윈도우 길이 (일, 1 이상)
    /// * `cancel` - 호출자 취소 토큰
    pub async fn reconstruct(
        &self,
        lots: &[AssetLot],
        window_days: u32,
        cancel: &CancellationToken,
    ) -> Result<PortfolioHistory, PortfolioError> {
        self.reconstruct_at(lots, window_days, Utc::now(), cancel).await
    }

    /// 주어진 기준 시각으로 가치 이력을 재구성합니다.
    ///
    /// `now`를 고정하면 동일 입력에 대해 결정적인 출력을 얻습니다
    /// (테스트 및 캐시 키 용도).
    pub async fn reconstruct_at(
        &self,
        lots: &[AssetLot],
        window_days: u32,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<PortfolioHistory, PortfolioError> {
        validate_request(lots, window_days)?;

        if cancel.is_cancelled() {
            return Err(PortfolioError::Cancelled);
        }

        let start = now - Duration::days(window_days as i64);
        let resolution = Resolution::for_window_days(window_days);
        let asset_ids: Vec<String> = lots
            .iter()
            .map(|lot| lot.asset_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let outcomes = self
            .fetch_all_series(&asset_ids, start, now, resolution, cancel)
            .await;

        if cancel.is_cancelled() {
            return Err(PortfolioError::Cancelled);
        }

        let mut series_map: HashMap<String, Vec<PricePoint>> = HashMap::new();
        let mut missing_assets = Vec::new();

        for (asset_id, outcome) in outcomes {
            match outcome {
                FetchOutcome::Series(mut series) if !series.is_empty() => {
                    series.sort_by_key(|p| p.timestamp);
                    series_map.insert(asset_id, series);
                }
                FetchOutcome::Series(_) => {
                    warn!(asset_id = %asset_id, "Asset has no price data in window");
                    missing_assets.push(MissingAsset {
                        asset_id,
                        error: "no price data".to_string(),
                    });
                }
                FetchOutcome::Failed(error) => {
                    missing_assets.push(MissingAsset { asset_id, error });
                }
                FetchOutcome::Cancelled => return Err(PortfolioError::Cancelled),
            }
        }
        // buffer_unordered 완료 순서는 비결정적이므로 보고 순서 고정
        missing_assets.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));

        // === 샘플 그리드 평가 ===
        let grid = sample_grid(start, now, self.config.sample_points);
        let mut points = Vec::with_capacity(grid.len());

        for timestamp in grid {
            let mut total = Decimal::ZERO;

            for lot in lots {
                if !lot.held_at(timestamp) {
                    continue;
                }
                let Some(series) = series_map.get(&lot.asset_id) else {
                    continue;
                };
                if let Some(price) = price_at(series, timestamp) {
                    total += lot.amount * price;
                }
            }

            points.push(ValuePoint { timestamp, value: total });
        }

        // 선행 0 구간 제거: 모든 lot이 아직 미보유인 샘플만 (내부 0은 유지)
        let first_kept = points
            .iter()
            .position(|p| !(p.value.is_zero() && lots.iter().all(|l| !l.held_at(p.timestamp))))
            .unwrap_or(points.len());
        points.drain(..first_kept);

        let undated_lots: Vec<String> = lots
            .iter()
            .filter(|lot| !lot.is_dated())
            .map(|lot| lot.symbol.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if !undated_lots.is_empty() {
            warn!(
                lots = ?undated_lots,
                "Valuing lots without purchase date across the whole window"
            );
        }

        info!(
            assets = asset_ids.len(),
            missing = missing_assets.len(),
            points = points.len(),
            window_days,
            "Portfolio history reconstructed"
        );

        Ok(PortfolioHistory {
            points,
            missing_assets,
            undated_lots,
        })
    }

    /// 자산별 가격 시계열을 동시 조회합니다.
    ///
    /// 동시성은 `max_concurrent_fetches`로 제한되고, 조회마다 개별
    /// 타임아웃이 적용됩니다. 실패는 호출자에게 outcome으로 전달될 뿐
    /// 다른 조회를 중단시키지 않습니다.
    async fn fetch_all_series(
        &self,
        asset_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
        cancel: &CancellationToken,
    ) -> Vec<(String, FetchOutcome)> {
        let timeout = self.config.fetch_timeout();

        stream::iter(asset_ids.iter().map(|asset_id| {
            let asset_id = asset_id.clone();
            let provider = &self.provider;
            let cancel = cancel.clone();

            async move {
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => FetchOutcome::Cancelled,
                    fetched = tokio::time::timeout(
                        timeout,
                        provider.price_series(&asset_id, start, end, resolution),
                    ) => match fetched {
                        Ok(Ok(series)) => FetchOutcome::Series(series),
                        Ok(Err(err)) => {
                            warn!(asset_id = %asset_id, error = %err, "Price fetch failed");
                            FetchOutcome::Failed(err.to_string())
                        }
                        Err(_) => {
                            warn!(asset_id = %asset_id, "Price fetch timed out");
                            FetchOutcome::Failed(ProviderError::Timeout.to_string())
                        }
                    },
                };

                (asset_id, outcome)
            }
        }))
        .buffer_unordered(self.config.max_concurrent_fetches.max(1))
        .collect()
        .await
    }
}

/// 요청 전제 조건 검증 (I/O 전에 수행).
fn validate_request(lots: &[AssetLot], window_days: u32) -> Result<(), PortfolioError> {
    if window_days == 0 {
        return Err(PortfolioError::InvalidInput(
            "window_days must be at least 1".to_string(),
        ));
    }

    for lot in lots {
        lot.validate().map_err(|err| match err {
            journal_core::JournalError::InvalidInput(msg) => PortfolioError::InvalidInput(msg),
            other => PortfolioError::InvalidInput(other.to_string()),
        })?;
    }

    Ok(())
}
