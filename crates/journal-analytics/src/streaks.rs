//! 연속 수익/손실 분석 (Streak).
//!
//! 시간순 거래 시퀀스에서 최장 연승/연패 구간을 찾고, 경험적 손실 확률로부터
//! 통계적으로 예상되는 연패 길이를 추정합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 연패 길이 추정에 사용하는 유의 수준.
///
/// `p_loss^k <= 0.05`가 되는 최소 k를 예상 연패 길이로 봅니다.
const STREAK_SIGNIFICANCE: f64 = 0.05;

/// 연속 거래 분석 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakAnalysis {
    /// 최장 연승 (연속 pnl > 0)
    pub max_win_streak: usize,

    /// 최장 연패 (연속 pnl <= 0)
    pub max_loss_streak: usize,

    /// 예상 연패 길이
    ///
    /// `ceil(ln 0.05 / ln p_loss)`. 손실 확률이 0 또는 1이면 정의되지
    /// 않으므로 0을 보고합니다.
    pub expected_loss_streak: u32,
}

impl StreakAnalysis {
    /// 시간순으로 정렬된 손익 시퀀스를 분석합니다.
    ///
    /// 수익 거래는 `pnl > 0`, 손실 거래는 `pnl <= 0`으로 분류합니다
    /// (본전 거래는 손실로 취급).
    pub fn from_ordered_pnls(pnls: &[Decimal]) -> Self {
        let mut max_win_streak = 0usize;
        let mut max_loss_streak = 0usize;
        let mut current_wins = 0usize;
        let mut current_losses = 0usize;
        let mut losses = 0usize;

        for pnl in pnls {
            if *pnl > Decimal::ZERO {
                current_wins += 1;
                current_losses = 0;
            } else {
                losses += 1;
                current_losses += 1;
                current_wins = 0;
            }

            max_win_streak = max_win_streak.max(current_wins);
            max_loss_streak = max_loss_streak.max(current_losses);
        }

        Self {
            max_win_streak,
            max_loss_streak,
            expected_loss_streak: expected_loss_streak(losses, pnls.len()),
        }
    }
}

/// 경험적 손실 확률로부터 예상 연패 길이를 계산합니다.
///
/// `p_loss^k <= 0.05`를 만족하는 최소 k, 즉 `ceil(ln 0.05 / ln p_loss)`.
///
/// # Returns
///
/// `p_loss`가 0 또는 1이면 (로그가 정의되지 않거나 발산) 0.
pub fn expected_loss_streak(losses: usize, total: usize) -> u32 {
    if total == 0 || losses == 0 || losses >= total {
        return 0;
    }

    let p_loss = losses as f64 / total as f64;
    (STREAK_SIGNIFICANCE.ln() / p_loss.ln()).ceil() as u32
}
