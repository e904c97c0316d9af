//! 저널 시스템 전반에서 사용되는 공통 타입.

use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 보유/거래 수량을 위한 타입.
pub type Quantity = Decimal;

/// 퍼센트 타입 (5.25 = 5.25%).
pub type Percentage = Decimal;
