//! 자산 곡선(Equity Curve) 및 낙폭 계산.
//!
//! 실현 손익의 누적 합을 청산 시각 순으로 쌓아 자산 곡선을 만들고,
//! 고점 대비 하락폭(drawdown)을 추적합니다.
//!
//! 곡선은 0에서 시작합니다 (초기 자본이 아니라 누적 실현 손익 기준).
//! 첫 거래가 손실이면 그 자체가 낙폭이 됩니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use journal_core::TradeRecord;

/// 0 나눗셈 방지용 최소값.
///
/// 고점이 0인 상태에서의 낙폭 비율, 낙폭이 0일 때의 회복 계수 계산에만
/// 사용됩니다.
pub const EPSILON: Decimal = dec!(0.000000001);

/// 자산 곡선의 한 포인트.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    /// 거래 청산 시각 (없으면 진입 시각)
    pub timestamp: DateTime<Utc>,

    /// 누적 실현 손익
    pub equity: Decimal,

    /// 해당 시점의 고점 대비 하락폭 (0 이상)
    pub drawdown: Decimal,
}

/// 자산 곡선 데이터.
///
/// 청산 거래들로부터 구축되며, 최대 낙폭과 그 시점의 고점을 함께 추적합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityCurve {
    /// 시계열 포인트 (청산 시각 오름차순)
    points: Vec<EquityPoint>,

    /// 최대 낙폭 (절대값)
    max_drawdown: Decimal,

    /// 최대 낙폭 발생 시점의 고점
    peak_at_max_drawdown: Decimal,
}

impl EquityCurve {
    /// 거래 목록에서 자산 곡선을 구축합니다.
    ///
    /// 미청산 거래는 제외되고, 입력 순서와 무관하게 청산 시각
    /// (없으면 진입 시각) 오름차순으로 재정렬됩니다.
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        let mut closed: Vec<(&TradeRecord, Decimal)> = trades
            .iter()
            .filter_map(|t| t.pnl.map(|pnl| (t, pnl)))
            .collect();
        closed.sort_by_key(|(t, _)| t.ordering_time());

        let mut points = Vec::with_capacity(closed.len());
        let mut equity = Decimal::ZERO;
        // 고점은 0 시드에서 시작: 첫 거래가 손실이면 바로 낙폭으로 집계됨
        let mut peak = Decimal::ZERO;
        let mut max_drawdown = Decimal::ZERO;
        let mut peak_at_max_drawdown = Decimal::ZERO;

        for (trade, pnl) in closed {
            equity += pnl;

            if equity > peak {
                peak = equity;
            }

            let drawdown = peak - equity;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
                peak_at_max_drawdown = peak;
            }

            points.push(EquityPoint {
                timestamp: trade.ordering_time(),
                equity,
                drawdown,
            });
        }

        Self {
            points,
            max_drawdown,
            peak_at_max_drawdown,
        }
    }

    /// 모든 데이터 포인트를 반환합니다.
    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    /// 최대 낙폭 (절대값)을 반환합니다.
    pub fn max_drawdown(&self) -> Decimal {
        self.max_drawdown
    }

    /// 최대 낙폭 발생 시점의 고점을 반환합니다.
    pub fn peak_at_max_drawdown(&self) -> Decimal {
        self.peak_at_max_drawdown
    }

    /// 최대 낙폭을 발생 시점 고점 대비 백분율로 반환합니다.
    pub fn max_drawdown_pct(&self) -> Decimal {
        if self.max_drawdown.is_zero() {
            return Decimal::ZERO;
        }
        self.max_drawdown / self.peak_at_max_drawdown.max(EPSILON) * dec!(100)
    }

    /// 마지막 포인트의 누적 손익 (거래가 없으면 0).
    pub fn final_equity(&self) -> Decimal {
        self.points.last().map(|p| p.equity).unwrap_or(Decimal::ZERO)
    }

    /// 데이터 포인트 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 데이터가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 거래 목록에서 플로팅용 자산 곡선 시계열을 반환합니다.
///
/// 누적 손익과 시점별 낙폭이 포함된 포인트 목록입니다.
pub fn equity_curve(trades: &[TradeRecord]) -> Vec<EquityPoint> {
    EquityCurve::from_trades(trades).points
}
