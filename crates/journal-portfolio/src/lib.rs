//! # Journal Portfolio
//!
//! 자산 보유분(lot)과 과거 가격 시계열로부터 포트폴리오 가치 곡선을
//! 재구성합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 가격 이력 Provider 인터페이스 및 CoinGecko 구현
//! - 균일 샘플 그리드 및 backward-fill 가격 해석
//! - 동시성 상한이 적용된 자산별 가격 조회 (자산별 타임아웃, 부분 실패 흡수)
//! - 요청 취소 및 세대(generation) 기반 결과 보호
//! - 현재 시점 포트폴리오 평가
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use journal_portfolio::{CoinGeckoProvider, PortfolioReconstructor, ReconstructionGate};
//!
//! let reconstructor = PortfolioReconstructor::new(CoinGeckoProvider::new());
//! let gate = ReconstructionGate::new();
//!
//! let ticket = gate.begin();
//! let history = reconstructor
//!     .reconstruct(&lots, 30, ticket.cancel_token())
//!     .await?;
//!
//! // 더 새로운 요청이 시작됐으면 결과를 버림
//! if gate.is_current(&ticket) {
//!     render(history);
//! }
//! ```

pub mod error;
pub mod gate;
pub mod provider;
pub mod reconstructor;
pub mod sampling;
pub mod valuation;

pub use error::{PortfolioError, ProviderError, Result};
pub use gate::{ReconstructionGate, ReconstructionTicket};
pub use provider::{CoinGeckoProvider, PriceHistoryProvider, Resolution};
pub use reconstructor::{MissingAsset, PortfolioHistory, PortfolioReconstructor, ValuePoint};
pub use valuation::{AssetValuation, PortfolioSnapshot};
