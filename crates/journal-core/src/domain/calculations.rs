//! 매매 손익 계산 공통 로직.
//!
//! 거래 기록 저장과 통계 집계에서 공유하는 P&L 계산 함수를 제공합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::trade::Direction;
use crate::types::Quantity;

/// 실현 손익 계산 (수수료 제외).
///
/// 진입가와 청산가의 차이로 손익을 계산합니다.
///
/// # Arguments
///
/// * `entry_price` - 진입 가격
/// * `exit_price` - 청산 가격
/// * `position_size` - 거래 수량
/// * `direction` - 포지션 방향 (Long/Short)
///
/// # Returns
///
/// 실현 손익 (수수료 제외)
pub fn realized_pnl(
    entry_price: Decimal,
    exit_price: Decimal,
    position_size: Quantity,
    direction: Direction,
) -> Decimal {
    match direction {
        // 롱 포지션: (청산가 - 진입가) × 수량
        Direction::Long => (exit_price - entry_price) * position_size,
        // 숏 포지션: (진입가 - 청산가) × 수량
        Direction::Short => (entry_price - exit_price) * position_size,
    }
}

/// 수수료 차감 후 순손익 계산.
pub fn net_pnl(gross_pnl: Decimal, fees: Decimal) -> Decimal {
    gross_pnl - fees
}

/// 수익률 계산 (백분율).
///
/// # Arguments
///
/// * `pnl` - 손익 (수수료 차감 후)
/// * `cost_basis` - 비용 기준 (진입 시 투입 자본)
///
/// # Returns
///
/// 수익률 (백분율, 예: 10.5 = 10.5%). 비용 기준이 0 이하이면 0.
pub fn return_pct(pnl: Decimal, cost_basis: Decimal) -> Decimal {
    if cost_basis > Decimal::ZERO {
        (pnl / cost_basis) * dec!(100)
    } else {
        Decimal::ZERO
    }
}

/// 명목 가치 계산 (가격 × 수량).
pub fn notional_value(price: Decimal, position_size: Quantity) -> Decimal {
    price * position_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realized_pnl_long() {
        let pnl = realized_pnl(dec!(100), dec!(110), dec!(10), Direction::Long);
        assert_eq!(pnl, dec!(100));
    }

    #[test]
    fn test_realized_pnl_short() {
        let pnl = realized_pnl(dec!(110), dec!(100), dec!(10), Direction::Short);
        assert_eq!(pnl, dec!(100));
    }

    #[test]
    fn test_realized_pnl_long_loss() {
        let pnl = realized_pnl(dec!(100), dec!(95), dec!(10), Direction::Long);
        assert_eq!(pnl, dec!(-50));
    }

    #[test]
    fn test_net_pnl() {
        assert_eq!(net_pnl(dec!(100), dec!(5)), dec!(95));
    }

    #[test]
    fn test_return_pct() {
        // 1000 투입에 50 수익 = 5%
        assert_eq!(return_pct(dec!(50), dec!(1000)), dec!(5));
    }

    #[test]
    fn test_return_pct_zero_cost() {
        assert_eq!(return_pct(dec!(50), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_notional_value() {
        assert_eq!(notional_value(dec!(100), dec!(10)), dec!(1000));
    }
}
