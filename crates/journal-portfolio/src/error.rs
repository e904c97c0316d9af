//! 포트폴리오 모듈 오류 타입.

use journal_core::JournalError;
use thiserror::Error;

/// 가격 이력 Provider 오류.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP 요청 실패
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 요청 한도 초과 (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// 자산을 찾을 수 없음
    #[error("Asset not found: {asset_id}")]
    NotFound { asset_id: String },

    /// 요청 타임아웃
    #[error("Request timed out")]
    Timeout,

    /// 응답 본문 파싱 실패
    #[error("Malformed response: {0}")]
    Parse(String),
}

/// 재구성 요청 수준 오류.
///
/// 자산별 업스트림 실패는 여기 포함되지 않습니다. 부분 결과로 흡수되어
/// `PortfolioHistory::missing_assets`로 보고됩니다.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// 잘못된 입력 (I/O 전에 거부됨)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 호출자에 의해 취소됨 (결과 없음, 실패 아님)
    #[error("Request cancelled")]
    Cancelled,
}

impl From<PortfolioError> for JournalError {
    fn from(err: PortfolioError) -> Self {
        match err {
            PortfolioError::InvalidInput(msg) => JournalError::InvalidInput(msg),
            PortfolioError::Cancelled => JournalError::Cancelled,
        }
    }
}

pub type Result<T> = std::result::Result<T, PortfolioError>;
