//! 거래 세션 분류.
//!
//! 거래 진입 시각의 UTC 시(hour)를 고정된 세션 윈도우에 대응시킵니다.
//! 세션 윈도우는 의도적으로 겹칩니다 (예: 런던/뉴욕 13–17시).
//! 하나의 거래는 진입 시각이 속하는 모든 세션에 각각 한 번씩 집계됩니다.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 거래 세션 (UTC 시간대 기준 윈도우).
///
/// 윈도우는 반개구간 `[start, end)`이며, 자정을 넘는 윈도우(시드니)는
/// 순환 처리됩니다. `Utc`는 하루 전체를 포괄하는 집계용 세션입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingSession {
    /// 시드니 세션 (22시–07시, 자정 순환)
    Sydney,
    /// 도쿄 세션 (00시–09시)
    Tokyo,
    /// 런던 세션 (08시–17시)
    London,
    /// 뉴욕 세션 (13시–22시)
    NewYork,
    /// 전일 집계 (00시–24시, 항상 포함)
    Utc,
}

impl TradingSession {
    /// 모든 세션 (분류 시 순회 순서 고정).
    pub const ALL: [TradingSession; 5] = [
        TradingSession::Sydney,
        TradingSession::Tokyo,
        TradingSession::London,
        TradingSession::NewYork,
        TradingSession::Utc,
    ];

    /// 세션 윈도우를 `(시작시, 종료시)` UTC 시(hour)로 반환합니다.
    pub fn window(&self) -> (u32, u32) {
        match self {
            TradingSession::Sydney => (22, 7),
            TradingSession::Tokyo => (0, 9),
            TradingSession::London => (8, 17),
            TradingSession::NewYork => (13, 22),
            TradingSession::Utc => (0, 24),
        }
    }

    /// 주어진 UTC 시(hour)가 이 세션 윈도우에 속하는지 확인합니다.
    pub fn contains_hour(&self, hour: u32) -> bool {
        let (start, end) = self.window();
        if start < end {
            start <= hour && hour < end
        } else {
            // 자정을 넘는 윈도우
            hour >= start || hour < end
        }
    }

    /// 주어진 시각이 속하는 모든 세션을 반환합니다.
    ///
    /// 윈도우가 겹치므로 결과는 항상 1개 이상입니다 (`Utc`가 항상 포함됨).
    pub fn sessions_at(time: DateTime<Utc>) -> Vec<TradingSession> {
        let hour = time.hour();
        Self::ALL
            .into_iter()
            .filter(|s| s.contains_hour(hour))
            .collect()
    }
}

impl fmt::Display for TradingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingSession::Sydney => write!(f, "Sydney"),
            TradingSession::Tokyo => write!(f, "Tokyo"),
            TradingSession::London => write!(f, "London"),
            TradingSession::NewYork => write!(f, "New York"),
            TradingSession::Utc => write!(f, "UTC"),
        }
    }
}
