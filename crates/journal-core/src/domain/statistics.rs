//! 그룹별 통계 집계 공통 로직.
//!
//! 집계 엔진이 세션/심볼/전략별 분해에 공유하는 버킷 통계를 제공합니다.
//! 미청산 거래(pnl 없음)는 모든 집계에서 제외됩니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::trade::TradeRecord;

/// 버킷(그룹) 단위 거래 통계.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    /// 거래 횟수
    pub count: usize,
    /// 수익 거래 횟수 (pnl > 0)
    pub wins: usize,
    /// 승률 (백분율)
    pub winrate: Decimal,
    /// 손익 합계
    pub pnl_sum: Decimal,
    /// 거래당 평균 손익
    pub avg_pnl: Decimal,
}

impl GroupStats {
    /// 손익 목록으로부터 버킷 통계를 계산합니다.
    pub fn from_pnls(pnls: &[Decimal]) -> Self {
        if pnls.is_empty() {
            return Self::default();
        }

        let count = pnls.len();
        let wins = pnls.iter().filter(|p| **p > Decimal::ZERO).count();
        let pnl_sum: Decimal = pnls.iter().copied().sum();

        Self {
            count,
            wins,
            winrate: (Decimal::from(wins) / Decimal::from(count)) * dec!(100),
            pnl_sum,
            avg_pnl: pnl_sum / Decimal::from(count),
        }
    }
}

/// 거래를 키 함수로 분할하여 버킷별 통계를 계산합니다.
///
/// 키 함수는 거래 하나가 속하는 버킷 키 목록을 반환합니다.
/// 겹치는 세션 윈도우처럼 하나의 거래가 여러 버킷에 들어갈 수 있으며,
/// 그 경우 속하는 버킷마다 한 번씩 집계됩니다.
///
/// 미청산 거래는 키 함수 호출 전에 걸러집니다.
///
/// # Arguments
///
/// * `trades` - 거래 목록 (정렬 불필요)
/// * `key_fn` - 거래 → 버킷 키 목록
///
/// # Returns
///
/// 버킷 키 → `GroupStats` (키 순서 고정을 위해 `BTreeMap`)
pub fn group_stats_by<F>(trades: &[TradeRecord], key_fn: F) -> BTreeMap<String, GroupStats>
where
    F: Fn(&TradeRecord) -> Vec<String>,
{
    let mut buckets: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();

    for trade in trades {
        let Some(pnl) = trade.pnl else {
            continue;
        };

        for key in key_fn(trade) {
            buckets.entry(key).or_default().push(pnl);
        }
    }

    buckets
        .into_iter()
        .map(|(key, pnls)| (key, GroupStats::from_pnls(&pnls)))
        .collect()
}
