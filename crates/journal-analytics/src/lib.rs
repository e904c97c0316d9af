//! # Journal Analytics
//!
//! 청산 완료된 거래 목록으로부터 성과 지표를 계산하는 집계 엔진입니다.
//!
//! 입력에 대한 순수 함수이며 부수 효과가 없습니다. 미청산 거래는
//! 내부에서 걸러지고, 입력 순서와 무관하게 항상 같은 결과를 반환합니다.
//!
//! # 제공 지표
//!
//! - 기본 통계: 승률, 총손익, 평균 수익/손실, 최고/최악 거래
//! - 자산 곡선 및 최대 낙폭 (Maximum Drawdown)
//! - 위험 조정 비율: 샤프, 소르티노, 칼마, Profit Factor, 회복 계수
//! - 기대값 (Expectancy) 및 R-배수
//! - 연속 수익/손실 분석 (Streak)
//! - 세션/심볼/전략별 분해
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use journal_analytics::compute_trade_metrics;
//!
//! let report = compute_trade_metrics(&trades);
//! println!("승률: {}%", report.winrate);
//! println!("최대 낙폭: {}", report.max_drawdown);
//! ```

pub mod equity;
pub mod grouping;
pub mod metrics;
pub mod streaks;

pub use equity::{equity_curve, EquityCurve, EquityPoint, EPSILON};
pub use grouping::{
    session_breakdown, strategy_breakdown, symbol_breakdown, UNASSIGNED_STRATEGY,
};
pub use metrics::{compute_trade_metrics, MetricsReport, TradeHighlight};
pub use streaks::StreakAnalysis;
