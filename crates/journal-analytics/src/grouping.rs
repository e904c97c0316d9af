//! 세션/심볼/전략별 분해.
//!
//! 공유 버킷 통계 헬퍼(`journal_core::group_stats_by`)를 통해 거래를
//! 분할하고 버킷별 `GroupStats`를 계산합니다.

use std::collections::BTreeMap;

use journal_core::{group_stats_by, GroupStats, TradeRecord};

/// 전략 라벨이 없는 거래가 들어가는 버킷 키.
pub const UNASSIGNED_STRATEGY: &str = "unassigned";

/// 거래 세션별 통계.
///
/// 세션 윈도우가 겹치므로 하나의 거래가 여러 세션에 집계될 수 있습니다
/// (속하는 세션마다 한 번씩).
pub fn session_breakdown(trades: &[TradeRecord]) -> BTreeMap<String, GroupStats> {
    group_stats_by(trades, |t| {
        t.sessions().iter().map(|s| s.to_string()).collect()
    })
}

/// 심볼별 통계.
pub fn symbol_breakdown(trades: &[TradeRecord]) -> BTreeMap<String, GroupStats> {
    group_stats_by(trades, |t| vec![t.symbol.clone()])
}

/// 전략별 통계.
///
/// 전략 라벨이 없는 거래는 [`UNASSIGNED_STRATEGY`] 버킷으로 들어갑니다.
pub fn strategy_breakdown(trades: &[TradeRecord]) -> BTreeMap<String, GroupStats> {
    group_stats_by(trades, |t| {
        vec![t
            .strategy
            .clone()
            .unwrap_or_else(|| UNASSIGNED_STRATEGY.to_string())]
    })
}
