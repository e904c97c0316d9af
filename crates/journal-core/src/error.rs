//! 저널 시스템의 에러 타입.
//!
//! 이 모듈은 저널 시스템 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 저널 에러.
#[derive(Debug, Error)]
pub enum JournalError {
    /// 잘못된 입력 (계산 전에 거부됨)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 외부 데이터 소스 에러
    #[error("업스트림 에러: {0}")]
    Upstream(String),

    /// 요청 한도 초과
    #[error("요청 한도 초과: {0}")]
    RateLimit(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 타임아웃
    #[error("타임아웃: {0}")]
    Timeout(String),

    /// 호출자에 의해 취소됨
    #[error("요청이 취소됨")]
    Cancelled,

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 저널 작업을 위한 Result 타입.
pub type JournalResult<T> = Result<T, JournalError>;

impl JournalError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            JournalError::Network(_) | JournalError::RateLimit(_) | JournalError::Timeout(_)
        )
    }

    /// 요청 전체를 중단시키는 에러인지 확인합니다.
    ///
    /// 자산별 업스트림 실패는 결과를 degrade시킬 뿐 요청을 중단하지 않으므로
    /// 여기에 포함되지 않습니다.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, JournalError::InvalidInput(_) | JournalError::Config(_))
    }
}

impl From<serde_json::Error> for JournalError {
    fn from(err: serde_json::Error) -> Self {
        JournalError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let network_err = JournalError::Network("connection reset".to_string());
        assert!(network_err.is_retryable());

        let timeout_err = JournalError::Timeout("price fetch".to_string());
        assert!(timeout_err.is_retryable());

        let input_err = JournalError::InvalidInput("amount <= 0".to_string());
        assert!(!input_err.is_retryable());
    }

    #[test]
    fn test_error_hard_failure() {
        let input_err = JournalError::InvalidInput("window_days == 0".to_string());
        assert!(input_err.is_hard_failure());

        // 업스트림 실패는 부분 결과로 흡수되므로 하드 실패가 아님
        let upstream_err = JournalError::Upstream("provider unavailable".to_string());
        assert!(!upstream_err.is_hard_failure());

        let cancelled = JournalError::Cancelled;
        assert!(!cancelled.is_hard_failure());
    }
}
