//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 기본값 → TOML 파일 → 환경 변수(`JOURNAL__` 접두사) 순서로 적용됩니다.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 포트폴리오 가치 재구성 설정
    #[serde(default)]
    pub portfolio: PortfolioConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 포트폴리오 가치 재구성 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PortfolioConfig {
    /// 가치 곡선 샘플 포인트 수 (윈도우 길이와 무관하게 고정)
    #[serde(default = "default_sample_points")]
    pub sample_points: usize,
    /// 동시 자산 가격 조회 상한
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// 자산별 가격 조회 타임아웃 (초)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// 가격 이력 Provider 기본 URL
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
    /// Provider 분당 요청 한도 (동시성 상한 산정의 근거)
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

fn default_sample_points() -> usize {
    100
}
fn default_max_concurrent_fetches() -> usize {
    8
}
fn default_fetch_timeout() -> u64 {
    25
}
fn default_provider_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}
fn default_rate_limit() -> u32 {
    1200
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            sample_points: default_sample_points(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            fetch_timeout_secs: default_fetch_timeout(),
            provider_base_url: default_provider_base_url(),
            rate_limit_per_minute: default_rate_limit(),
        }
    }
}

impl PortfolioConfig {
    /// 자산별 조회 타임아웃을 `Duration`으로 반환합니다.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("JOURNAL")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
