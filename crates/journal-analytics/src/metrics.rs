//! 성과 지표 계산 모듈.
//!
//! 청산 완료된 거래 목록에서 종합 성과 리포트를 계산합니다:
//! - 승률 (Win Rate): 수익 거래 비율
//! - 최대 낙폭 (Maximum Drawdown): 고점 대비 최대 하락폭
//! - 샤프 비율 (Sharpe Ratio): 변동성 대비 수익률
//! - 소르티노 비율 (Sortino Ratio): 하방 위험 대비 수익률
//! - 프로핏 팩터 (Profit Factor): 총 수익 / 총 손실 비율
//! - 기대값 (Expectancy): 거래당 기대 수익
//! - 연속 수익/손실 분석 및 세션/심볼/전략별 분해
//!
//! 이 엔진은 거래 하나를 하나의 "기간"으로 취급합니다 (달력 일 단위가
//! 아님). 고정 거래 캘린더 없이도 비율을 계산하기 위한 선택입니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use journal_analytics::compute_trade_metrics;
//!
//! let report = compute_trade_metrics(&trades);
//!
//! if report.winrate > dec!(60) && report.sharpe > dec!(1) {
//!     println!("전략 성과가 양호합니다");
//! }
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use journal_core::{return_pct, GroupStats, TradeRecord};

use crate::equity::{EquityCurve, EPSILON};
use crate::grouping::{session_breakdown, strategy_breakdown, symbol_breakdown};
use crate::streaks::StreakAnalysis;

/// 칼마 비율 연율화에 사용하는 연간 일수.
///
/// 암호화폐 시장은 365일 거래되므로 252 거래일 대신 365를 사용합니다.
const DAYS_PER_YEAR: Decimal = dec!(365);

/// 최고/최악 거래 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeHighlight {
    /// 거래 심볼
    pub symbol: String,
    /// 실현 손익
    pub pnl: Decimal,
    /// 청산 시각 (없으면 진입 시각)
    pub time: DateTime<Utc>,
}

/// 종합 성과 리포트.
///
/// 매 호출마다 전체 재계산되는 값 객체입니다 (식별자 없음).
///
/// 정의되지 않거나 무한대인 비율은 0과 구분하기 위해 `None`으로
/// 보고됩니다 (예: 손실이 전혀 없을 때의 프로핏 팩터). 호출자는
/// `None`을 "-"로 렌더링할 수 있습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsReport {
    /// 총 거래 횟수 (청산 완료만)
    pub total_trades: usize,

    /// 수익 거래 횟수 (pnl > 0)
    pub wins: usize,

    /// 손실 거래 횟수 (pnl <= 0, 본전 포함)
    pub losses: usize,

    /// 승률 (백분율, 거래 없으면 0)
    pub winrate: Decimal,

    /// 총 손익
    pub total_pnl: Decimal,

    /// 평균 수익 (수익 거래만, 없으면 0)
    pub avg_win: Decimal,

    /// 평균 손실 (손실 거래만, 부호 있음 — 0 이하)
    pub avg_loss: Decimal,

    /// 최고 수익 거래 (동률이면 먼저 청산된 거래)
    pub best_trade: Option<TradeHighlight>,

    /// 최악 손실 거래 (동률이면 먼저 청산된 거래)
    pub worst_trade: Option<TradeHighlight>,

    /// 총 수익 (수익 거래 합계)
    pub gross_profit: Decimal,

    /// 총 손실 (손실 거래 합계, 양수로 표시)
    pub gross_loss: Decimal,

    /// 최대 낙폭 (누적 손익 기준 절대값)
    pub max_drawdown: Decimal,

    /// 최대 낙폭 (발생 시점 고점 대비 백분율)
    pub max_drawdown_pct: Decimal,

    /// 회복 계수 (총손익 / 최대 낙폭)
    pub recovery_factor: Decimal,

    /// 샤프 비율 (거래당 수익률 기준, 연율화 없음)
    ///
    /// 거래가 2건 미만이거나 표준편차가 0이면 0.
    pub sharpe: Decimal,

    /// 소르티노 비율 (하방 편차 기준)
    ///
    /// 하방 편차가 0이면 (손실 없음) 0.
    pub sortino: Decimal,

    /// 프로핏 팩터 (총수익 / 총손실)
    ///
    /// 총손실이 0이면 무한대 → `None` 보고.
    pub profit_factor: Option<Decimal>,

    /// 칼마 비율 (연율화 수익률 / 최대 낙폭 비율)
    pub calmar: Decimal,

    /// 기대값: 승률×평균수익 + 패률×평균손실
    pub expectancy: Decimal,

    /// 평균 R-배수
    ///
    /// 명시적 손절 필드가 없으므로 투입 자본(진입가×수량)을 리스크로
    /// 사용합니다. 결과적으로 거래당 수익률 평균과 동일합니다.
    pub avg_r_multiple: Decimal,

    /// 손익비 (평균수익 / |평균손실|)
    ///
    /// 평균 손실이 0이면 `None` 보고.
    pub win_loss_ratio: Option<Decimal>,

    /// 연속 수익/손실 분석
    pub streaks: StreakAnalysis,

    /// 가장 많이 거래된 심볼
    pub most_traded_symbol: Option<String>,

    /// 손익 합계가 가장 큰 세션
    pub most_successful_session: Option<String>,

    /// 세션별 통계 (겹치는 세션에는 각각 집계)
    pub session_stats: BTreeMap<String, GroupStats>,

    /// 심볼별 통계
    pub symbol_stats: BTreeMap<String, GroupStats>,

    /// 전략별 통계
    pub strategy_stats: BTreeMap<String, GroupStats>,
}

/// 거래 목록에서 성과 리포트를 계산합니다.
///
/// 입력에 대한 순수 함수입니다. 미청산 거래는 제외되고, 입력 순서와
/// 무관하게 청산 시각(없으면 진입 시각) 기준으로 재정렬됩니다.
/// 빈 입력을 포함한 어떤 입력에서도 실패하지 않으며, 모든 비율은
/// 정의된 대체값(0 또는 `None`)을 가집니다.
pub fn compute_trade_metrics(trades: &[TradeRecord]) -> MetricsReport {
    let mut closed: Vec<(&TradeRecord, Decimal)> = trades
        .iter()
        .filter_map(|t| t.pnl.map(|pnl| (t, pnl)))
        .collect();
    closed.sort_by_key(|(t, _)| t.ordering_time());

    if closed.is_empty() {
        return MetricsReport::default();
    }

    let total_trades = closed.len();
    let n = Decimal::from(total_trades);

    // === 단일 순회 누적 ===
    let mut wins = 0usize;
    let mut total_pnl = Decimal::ZERO;
    let mut gross_profit = Decimal::ZERO;
    let mut loss_sum = Decimal::ZERO;
    let mut loss_count = 0usize;
    let mut returns: Vec<Decimal> = Vec::with_capacity(total_trades);
    let mut ordered_pnls: Vec<Decimal> = Vec::with_capacity(total_trades);
    let mut r_multiple_sum = Decimal::ZERO;
    let mut best: Option<(&TradeRecord, Decimal)> = None;
    let mut worst: Option<(&TradeRecord, Decimal)> = None;

    for &(trade, pnl) in &closed {
        total_pnl += pnl;
        ordered_pnls.push(pnl);

        if pnl > Decimal::ZERO {
            wins += 1;
            gross_profit += pnl;
        } else {
            loss_count += 1;
            loss_sum += pnl;
        }

        // 거래당 수익률: 저장된 값이 없으면 투입 자본 기준으로 재계산
        let r = trade
            .pnl_percent
            .unwrap_or_else(|| return_pct(pnl, trade.capital_committed()));
        returns.push(r);

        let committed = trade.capital_committed();
        if committed > Decimal::ZERO {
            r_multiple_sum += pnl / committed;
        }

        // 동률이면 먼저 청산된 거래 유지 (시간순 순회이므로 strict 비교)
        if best.map(|(_, b)| pnl > b).unwrap_or(true) {
            best = Some((trade, pnl));
        }
        if worst.map(|(_, w)| pnl < w).unwrap_or(true) {
            worst = Some((trade, pnl));
        }
    }

    let losses = loss_count;
    let gross_loss = loss_sum.abs();
    let winrate = Decimal::from(wins) / n * dec!(100);

    let avg_win = if wins > 0 {
        gross_profit / Decimal::from(wins)
    } else {
        Decimal::ZERO
    };
    // 부호 있는 평균 손실 (0 이하)
    let avg_loss = if losses > 0 {
        loss_sum / Decimal::from(losses)
    } else {
        Decimal::ZERO
    };

    // === 자산 곡선 및 낙폭 ===
    let curve = EquityCurve::from_trades(trades);
    let max_drawdown = curve.max_drawdown();
    let max_drawdown_pct = curve.max_drawdown_pct();
    let recovery_factor = total_pnl / max_drawdown.max(EPSILON);

    // === 위험 조정 비율 (거래당 수익률 기준) ===
    let mean_r = returns.iter().copied().sum::<Decimal>() / n;
    let sharpe = sharpe_ratio(&returns, mean_r);
    let sortino = sortino_ratio(&returns, mean_r);

    // === 칼마 비율 (365일 선형 연율화) ===
    let first_entry = closed
        .iter()
        .map(|(t, _)| t.entry_time)
        .min()
        .unwrap_or_else(Utc::now);
    let last_exit = closed
        .last()
        .map(|(t, _)| t.ordering_time())
        .unwrap_or_else(Utc::now);
    let span_days = Decimal::from((last_exit - first_entry).num_days().max(1));

    let total_pnl_percent: Decimal = returns.iter().copied().sum();
    let annualized_pct = total_pnl_percent * DAYS_PER_YEAR / span_days;
    let calmar = if max_drawdown_pct > Decimal::ZERO {
        annualized_pct / max_drawdown_pct
    } else {
        Decimal::ZERO
    };

    // === 기대값 및 비율 ===
    let win_prob = winrate / dec!(100);
    let expectancy = win_prob * avg_win + (Decimal::ONE - win_prob) * avg_loss;

    let profit_factor = if gross_loss.is_zero() {
        None
    } else {
        Some(gross_profit / gross_loss)
    };

    let win_loss_ratio = if avg_loss.is_zero() {
        None
    } else {
        Some(avg_win / avg_loss.abs())
    };

    // === 그룹별 분해 ===
    let session_stats = session_breakdown(trades);
    let symbol_stats = symbol_breakdown(trades);
    let strategy_stats = strategy_breakdown(trades);

    let most_traded_symbol = most_traded_symbol(&closed);
    let most_successful_session = most_successful_session(&session_stats);

    let report = MetricsReport {
        total_trades,
        wins,
        losses,
        winrate,
        total_pnl,
        avg_win,
        avg_loss,
        best_trade: best.map(|(t, pnl)| highlight(t, pnl)),
        worst_trade: worst.map(|(t, pnl)| highlight(t, pnl)),
        gross_profit,
        gross_loss,
        max_drawdown,
        max_drawdown_pct,
        recovery_factor,
        sharpe,
        sortino,
        profit_factor,
        calmar,
        expectancy,
        avg_r_multiple: r_multiple_sum / n,
        win_loss_ratio,
        streaks: StreakAnalysis::from_ordered_pnls(&ordered_pnls),
        most_traded_symbol,
        most_successful_session,
        session_stats,
        symbol_stats,
        strategy_stats,
    };

    debug!(
        total_trades = report.total_trades,
        wins = report.wins,
        "Trade metrics computed"
    );

    report
}

fn highlight(trade: &TradeRecord, pnl: Decimal) -> TradeHighlight {
    TradeHighlight {
        symbol: trade.symbol.clone(),
        pnl,
        time: trade.ordering_time(),
    }
}

/// 샤프 비율: 평균 수익률 / 수익률 모표준편차.
///
/// 거래가 2건 미만이거나 표준편차가 0이면 0.
fn sharpe_ratio(returns: &[Decimal], mean_r: Decimal) -> Decimal {
    if returns.len() < 2 {
        return Decimal::ZERO;
    }

    let n = Decimal::from(returns.len());
    let variance = returns
        .iter()
        .map(|r| {
            let d = *r - mean_r;
            d * d
        })
        .sum::<Decimal>()
        / n;
    let std_dev = decimal_sqrt(variance);

    if std_dev.is_zero() {
        Decimal::ZERO
    } else {
        mean_r / std_dev
    }
}

/// 소르티노 비율: 평균 수익률 / 하방 편차.
///
/// 하방 편차는 `min(r, 0)` 값들의 제곱 평균 제곱근입니다 (수익 거래는
/// 0으로 포함 — 표준 소르티노 정의). 하방 편차가 0이면 0.
fn sortino_ratio(returns: &[Decimal], mean_r: Decimal) -> Decimal {
    if returns.len() < 2 {
        return Decimal::ZERO;
    }

    let n = Decimal::from(returns.len());
    let downside_variance = returns
        .iter()
        .map(|r| {
            let d = (*r).min(Decimal::ZERO);
            d * d
        })
        .sum::<Decimal>()
        / n;
    let downside_dev = decimal_sqrt(downside_variance);

    if downside_dev.is_zero() {
        Decimal::ZERO
    } else {
        mean_r / downside_dev
    }
}

/// 가장 많이 거래된 심볼 (동률이면 사전순 앞).
fn most_traded_symbol(closed: &[(&TradeRecord, Decimal)]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (trade, _) in closed {
        *counts.entry(trade.symbol.as_str()).or_default() += 1;
    }

    let mut top: Option<(&str, usize)> = None;
    for (symbol, count) in counts {
        if top.map(|(_, c)| count > c).unwrap_or(true) {
            top = Some((symbol, count));
        }
    }

    top.map(|(symbol, _)| symbol.to_string())
}

/// 손익 합계가 가장 큰 세션 (동률이면 사전순 앞).
fn most_successful_session(
    session_stats: &BTreeMap<String, GroupStats>,
) -> Option<String> {
    let mut top: Option<(&String, Decimal)> = None;
    for (session, stats) in session_stats {
        if stats.count == 0 {
            continue;
        }
        if top.map(|(_, sum)| stats.pnl_sum > sum).unwrap_or(true) {
            top = Some((session, stats.pnl_sum));
        }
    }

    top.map(|(session, _)| session.clone())
}

/// Decimal 제곱근 (뉴턴-랩슨 방법).
///
/// 초기 추정값 `value / 2`에서 시작해 `10^-10` 정밀도까지 반복합니다.
fn decimal_sqrt(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut guess = value / Decimal::TWO;
    if guess.is_zero() {
        guess = value;
    }
    let precision = Decimal::new(1, 10);

    for _ in 0..50 {
        let next = (guess + value / guess) / Decimal::TWO;
        if (next - guess).abs() < precision {
            return next;
        }
        guess = next;
    }

    guess
}
