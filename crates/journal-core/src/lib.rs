//! # Journal Core
//!
//! 트레이딩 저널의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 저널 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 거래 기록 (청산/미청산)
//! - 손익 계산 공통 로직
//! - 거래 세션 분류 (UTC 시간대 기준)
//! - 암호화폐 보유분(lot) 및 가격 데이터 구조체
//! - 그룹별 통계 집계 유틸리티
//! - 에러 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
