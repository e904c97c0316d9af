//! 현재 시점 포트폴리오 평가.
//!
//! 보유분별 현재 가치와 (매수가가 있는 경우) 비용 기준 손익을 계산합니다.
//! 가치 이력 재구성과 같은 동시성/부분 실패 정책을 따릅니다:
//! 자산별 현재가 조회 실패는 흡수되어 해당 자산의 `error` 필드로
//! 보고되고, 나머지 자산으로 합계를 계산합니다.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::PortfolioError;
use crate::provider::PriceHistoryProvider;
use crate::reconstructor::PortfolioReconstructor;
use journal_core::AssetLot;

/// 보유분 하나의 현재 평가.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetValuation {
    /// 표시용 심볼
    pub symbol: String,
    /// 자산 식별자
    pub asset_id: String,
    /// 보유 수량
    pub amount: Decimal,
    /// 현재 단가 (조회 실패 시 None)
    pub current_price: Option<Decimal>,
    /// 현재 가치 (수량 × 현재 단가)
    pub current_value: Option<Decimal>,
    /// 비용 기준 (매수가가 있는 경우만)
    pub cost: Option<Decimal>,
    /// 손익 (비용 기준이 있는 경우만)
    pub pnl: Option<Decimal>,
    /// 손익률 (백분율, 비용 기준이 있는 경우만)
    pub pnl_percent: Option<Decimal>,
    /// 조회 실패 사유
    pub error: Option<String>,
}

/// 포트폴리오 현재 평가 요약.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// 총 가치 (USD)
    pub total_value: Decimal,
    /// 총 비용 (매수가가 기록된 보유분만)
    pub total_cost: Decimal,
    /// 총 손익 (비용 기준이 없으면 0)
    pub total_pnl: Decimal,
    /// 총 손익률 (백분율)
    pub total_pnl_percent: Decimal,
    /// 보유분별 평가 (입력 순서 유지)
    pub assets: Vec<AssetValuation>,
    /// 평가 기준 시각
    pub generated_at: DateTime<Utc>,
}

impl PortfolioSnapshot {
    /// 조회 실패로 0 평가된 보유분이 있는지 여부.
    pub fn is_degraded(&self) -> bool {
        self.assets.iter().any(|a| a.error.is_some())
    }
}

impl<P: PriceHistoryProvider> PortfolioReconstructor<P> {
    /// 현재 시점 포트폴리오 평가를 계산합니다.
    ///
    /// 서로 다른 자산별로 현재가를 동시 조회하고 (동시성 상한, 자산별
    /// 타임아웃), 보유분별 가치와 손익을 합산합니다.
    pub async fn snapshot(
        &self,
        lots: &[AssetLot],
        cancel: &CancellationToken,
    ) -> Result<PortfolioSnapshot, PortfolioError> {
        for lot in lots {
            lot.validate().map_err(|err| match err {
                journal_core::JournalError::InvalidInput(msg) => {
                    PortfolioError::InvalidInput(msg)
                }
                other => PortfolioError::InvalidInput(other.to_string()),
            })?;
        }

        if cancel.is_cancelled() {
            return Err(PortfolioError::Cancelled);
        }

        let asset_ids: Vec<String> = lots
            .iter()
            .map(|lot| lot.asset_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let timeout = self.config().fetch_timeout();

        // 자산별 현재가 동시 조회 (실패는 흡수)
        let quotes: Vec<(String, Result<Decimal, String>)> =
            stream::iter(asset_ids.iter().map(|asset_id| {
                let asset_id = asset_id.clone();
                let provider = self.provider_ref();
                let cancel = cancel.clone();

                async move {
                    let quote = tokio::select! {
                        _ = cancel.cancelled() => Err("cancelled".to_string()),
                        fetched = tokio::time::timeout(timeout, provider.spot_price(&asset_id)) => {
                            match fetched {
                                Ok(Ok(point)) => Ok(point.price),
                                Ok(Err(err)) => {
                                    warn!(asset_id = %asset_id, error = %err, "Spot price fetch failed");
                                    Err(err.to_string())
                                }
                                Err(_) => Err("request timed out".to_string()),
                            }
                        }
                    };

                    (asset_id, quote)
                }
            }))
            .buffer_unordered(self.config().max_concurrent_fetches.max(1))
            .collect()
            .await;

        if cancel.is_cancelled() {
            return Err(PortfolioError::Cancelled);
        }

        let mut prices: HashMap<String, Decimal> = HashMap::new();
        let mut errors: HashMap<String, String> = HashMap::new();
        for (asset_id, quote) in quotes {
            match quote {
                Ok(price) => {
                    prices.insert(asset_id, price);
                }
                Err(error) => {
                    errors.insert(asset_id, error);
                }
            }
        }

        let mut total_value = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;
        let mut assets = Vec::with_capacity(lots.len());

        for lot in lots {
            match prices.get(&lot.asset_id) {
                Some(price) => {
                    let current_value = lot.amount * *price;
                    total_value += current_value;

                    let cost = lot.cost_basis();
                    let pnl = cost.map(|c| current_value - c);
                    let pnl_percent = cost.and_then(|c| {
                        if c > Decimal::ZERO {
                            pnl.map(|p| p / c * dec!(100))
                        } else {
                            None
                        }
                    });
                    if let Some(c) = cost {
                        total_cost += c;
                    }

                    assets.push(AssetValuation {
                        symbol: lot.symbol.clone(),
                        asset_id: lot.asset_id.clone(),
                        amount: lot.amount,
                        current_price: Some(*price),
                        current_value: Some(current_value),
                        cost,
                        pnl,
                        pnl_percent,
                        error: None,
                    });
                }
                None => {
                    let error = errors
                        .get(&lot.asset_id)
                        .cloned()
                        .unwrap_or_else(|| "no quote".to_string());

                    assets.push(AssetValuation {
                        symbol: lot.symbol.clone(),
                        asset_id: lot.asset_id.clone(),
                        amount: lot.amount,
                        current_price: None,
                        current_value: None,
                        cost: None,
                        pnl: None,
                        pnl_percent: None,
                        error: Some(error),
                    });
                }
            }
        }

        // 비용 기준이 전혀 없으면 손익은 0으로 보고
        let total_pnl = if total_cost > Decimal::ZERO {
            total_value - total_cost
        } else {
            Decimal::ZERO
        };
        let total_pnl_percent = if total_cost > Decimal::ZERO {
            total_pnl / total_cost * dec!(100)
        } else {
            Decimal::ZERO
        };

        info!(
            assets = lots.len(),
            failed = errors.len(),
            "Portfolio snapshot computed"
        );

        Ok(PortfolioSnapshot {
            total_value,
            total_cost,
            total_pnl,
            total_pnl_percent,
            assets,
            generated_at: Utc::now(),
        })
    }
}
