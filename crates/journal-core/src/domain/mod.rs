//! 저널 도메인 모델.
//!
//! - `trade`: 거래 기록 및 방향
//! - `calculations`: 손익 계산 공통 로직
//! - `session`: 거래 세션 분류 (UTC 시간대)
//! - `asset`: 암호화폐 보유분(lot) 및 가격 포인트
//! - `statistics`: 그룹별 통계 집계 (공유 헬퍼)

pub mod asset;
pub mod calculations;
pub mod session;
pub mod statistics;
pub mod trade;

pub use asset::*;
pub use calculations::*;
pub use session::*;
pub use statistics::*;
pub use trade::*;
