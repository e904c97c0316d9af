//! 암호화폐 보유분(lot) 및 가격 데이터 구조체.
//!
//! 하나의 lot은 한 자산의 개별 매수 기록입니다 (수량 + 선택적 매수가/매수일).
//! CRUD 계층이 소유하며 분석 엔진은 읽기 전용입니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculations::notional_value;
use crate::error::{JournalError, JournalResult};

/// 자산 보유분 (하나의 매수 기록).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetLot {
    /// 표시용 심볼 (예: "BTC")
    pub symbol: String,

    /// 가격 이력 조회에 사용하는 불투명 식별자 (예: "bitcoin")
    pub asset_id: String,

    /// 보유 수량 (양수)
    pub amount: Decimal,

    /// 매수 단가 (비용 기준, 선택)
    pub purchase_price: Option<Decimal>,

    /// 매수 시각 (선택)
    ///
    /// 없으면 요청 윈도우 전체 기간 보유한 것으로 간주되며,
    /// 결과는 정확도 저하(degraded)로 표시됩니다.
    pub purchase_date: Option<DateTime<Utc>>,
}

impl AssetLot {
    /// 새 보유분을 생성합니다.
    pub fn new(symbol: impl Into<String>, asset_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            asset_id: asset_id.into(),
            amount,
            purchase_price: None,
            purchase_date: None,
        }
    }

    /// 매수 정보를 설정합니다.
    pub fn with_purchase(mut self, price: Decimal, date: DateTime<Utc>) -> Self {
        self.purchase_price = Some(price);
        self.purchase_date = Some(date);
        self
    }

    /// 매수 단가만 설정합니다 (매수일 미상).
    pub fn with_purchase_price(mut self, price: Decimal) -> Self {
        self.purchase_price = Some(price);
        self
    }

    /// 주어진 시각에 이 lot을 보유 중인지 확인합니다.
    ///
    /// 매수일이 없으면 항상 보유 중으로 간주합니다.
    pub fn held_at(&self, time: DateTime<Utc>) -> bool {
        match self.purchase_date {
            Some(purchased) => time >= purchased,
            None => true,
        }
    }

    /// 매수일 기록 여부.
    pub fn is_dated(&self) -> bool {
        self.purchase_date.is_some()
    }

    /// 비용 기준 (수량 × 매수 단가). 매수가 미상이면 None.
    pub fn cost_basis(&self) -> Option<Decimal> {
        self.purchase_price
            .map(|price| notional_value(price, self.amount))
    }

    /// 보유분 필드의 전제 조건을 검증합니다.
    pub fn validate(&self) -> JournalResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(JournalError::InvalidInput(format!(
                "lot amount must be positive: {} ({})",
                self.amount, self.asset_id
            )));
        }
        if self.asset_id.is_empty() {
            return Err(JournalError::InvalidInput(
                "lot asset_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// 가격 이력의 한 포인트.
///
/// Provider가 자산별로 타임스탬프 오름차순 시퀀스로 반환합니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 시각 (UTC)
    pub timestamp: DateTime<Utc>,
    /// 가격 (USD)
    pub price: Decimal,
}

impl PricePoint {
    /// 새 가격 포인트를 생성합니다.
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}
