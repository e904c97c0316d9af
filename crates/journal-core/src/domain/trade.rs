//! 거래 기록 도메인 모델.
//!
//! 하나의 청산 완료(또는 미청산) 포지션을 나타내는 `TradeRecord`와
//! 거래 방향 `Direction`을 정의합니다.
//!
//! CRUD 계층이 생성/수정/삭제를 소유하며, 분석 엔진은 불변 스냅샷만 읽습니다.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calculations::{net_pnl, notional_value, realized_pnl, return_pct};
use super::session::TradingSession;
use crate::error::{JournalError, JournalResult};

/// 거래 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// 롱 포지션 (가격 상승 시 수익)
    Long,
    /// 숏 포지션 (가격 하락 시 수익)
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// 거래 기록 (청산 완료 또는 미청산).
///
/// `pnl`은 `exit_price`가 있을 때만 정의됩니다.
/// `exit_price`가 없는 거래는 모든 통계에서 제외됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// 고유 식별자
    pub id: Uuid,

    /// 거래 심볼 (예: "BTC/USDT", "AAPL")
    pub symbol: String,

    /// 거래 방향
    pub direction: Direction,

    /// 진입 가격
    pub entry_price: Decimal,

    /// 청산 가격 (미청산이면 None)
    pub exit_price: Option<Decimal>,

    /// 거래 수량 (양수)
    pub position_size: Decimal,

    /// 총 수수료 (진입 + 청산, 0 이상)
    pub fees: Decimal,

    /// 진입 시각 (UTC)
    pub entry_time: DateTime<Utc>,

    /// 청산 시각 (UTC, 미청산이면 None)
    pub exit_time: Option<DateTime<Utc>>,

    /// 실현 손익 (수수료 차감 후, 미청산이면 None)
    pub pnl: Option<Decimal>,

    /// 수익률 (투입 자본 대비 백분율, 미청산이면 None)
    pub pnl_percent: Option<Decimal>,

    /// 전략 라벨 (자유 형식 식별자)
    pub strategy: Option<String>,
}

impl TradeRecord {
    /// 청산 완료된 거래를 생성합니다.
    ///
    /// 진입/청산 가격과 방향을 기반으로 `pnl`과 `pnl_percent`를 자동 계산합니다.
    ///
    /// # 예시
    ///
    /// ```rust,ignore
    /// let trade = TradeRecord::closed(
    ///     "BTC/USDT",
    ///     Direction::Long,
    ///     dec!(50000),  // 진입가
    ///     dec!(52000),  // 청산가
    ///     dec!(0.1),    // 수량
    ///     dec!(10),     // 수수료
    ///     entry_time,
    ///     exit_time,
    /// );
    /// // pnl = (52000 - 50000) * 0.1 - 10 = 190
    /// ```
    pub fn closed(
        symbol: impl Into<String>,
        direction: Direction,
        entry_price: Decimal,
        exit_price: Decimal,
        position_size: Decimal,
        fees: Decimal,
        entry_time: DateTime<Utc>,
        exit_time: DateTime<Utc>,
    ) -> Self {
        let gross = realized_pnl(entry_price, exit_price, position_size, direction);
        let pnl = net_pnl(gross, fees);
        let committed = notional_value(entry_price, position_size);
        let pnl_percent = return_pct(pnl, committed);

        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            direction,
            entry_price,
            exit_price: Some(exit_price),
            position_size,
            fees,
            entry_time,
            exit_time: Some(exit_time),
            pnl: Some(pnl),
            pnl_percent: Some(pnl_percent),
            strategy: None,
        }
    }

    /// 미청산 거래를 생성합니다.
    ///
    /// `pnl`/`pnl_percent`는 청산 전까지 None입니다.
    pub fn open(
        symbol: impl Into<String>,
        direction: Direction,
        entry_price: Decimal,
        position_size: Decimal,
        fees: Decimal,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            direction,
            entry_price,
            exit_price: None,
            position_size,
            fees,
            entry_time,
            exit_time: None,
            pnl: None,
            pnl_percent: None,
            strategy: None,
        }
    }

    /// 전략 라벨을 설정합니다.
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// 청산 완료 여부.
    pub fn is_closed(&self) -> bool {
        self.exit_price.is_some()
    }

    /// 수익 거래 여부 (pnl > 0). 미청산이면 false.
    pub fn is_winner(&self) -> bool {
        self.pnl.map(|p| p > Decimal::ZERO).unwrap_or(false)
    }

    /// 투입 자본 (진입가 × 수량).
    pub fn capital_committed(&self) -> Decimal {
        notional_value(self.entry_price, self.position_size)
    }

    /// 보유 기간. 미청산이면 None.
    pub fn holding_duration(&self) -> Option<Duration> {
        self.exit_time
            .map(|exit| exit.signed_duration_since(self.entry_time))
    }

    /// 통계 정렬에 사용하는 시각 (청산 시각, 없으면 진입 시각).
    pub fn ordering_time(&self) -> DateTime<Utc> {
        self.exit_time.unwrap_or(self.entry_time)
    }

    /// 진입 시각이 속하는 거래 세션 목록.
    ///
    /// 세션 윈도우가 겹치므로 둘 이상일 수 있습니다. 저장되지 않고
    /// 읽을 때마다 계산됩니다.
    pub fn sessions(&self) -> Vec<TradingSession> {
        TradingSession::sessions_at(self.entry_time)
    }

    /// 거래 필드의 전제 조건을 검증합니다.
    ///
    /// CRUD 계층이 저장 전에 호출하는 용도입니다. 통계 집계 자체는
    /// 실패하지 않으며 이 검증에 의존하지 않습니다.
    pub fn validate(&self) -> JournalResult<()> {
        if self.position_size <= Decimal::ZERO {
            return Err(JournalError::InvalidInput(format!(
                "position_size must be positive: {}",
                self.position_size
            )));
        }
        if self.fees < Decimal::ZERO {
            return Err(JournalError::InvalidInput(format!(
                "fees must be non-negative: {}",
                self.fees
            )));
        }
        if self.exit_price.is_some() != self.exit_time.is_some() {
            return Err(JournalError::InvalidInput(
                "exit_price and exit_time must be set together".to_string(),
            ));
        }
        Ok(())
    }
}
