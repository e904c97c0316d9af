//! 샘플 타임스탬프 그리드 및 가격 해석.
//!
//! 재구성 윈도우를 고정 개수의 균일 간격 샘플로 나누고, 각 샘플 시점의
//! 가격을 backward-fill(해당 시점 이전의 가장 최근 포인트)로 해석합니다.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use journal_core::PricePoint;

/// `[start, end]` 구간의 균일 간격 샘플 타임스탬프를 생성합니다.
///
/// 마지막 샘플은 항상 `end`와 일치합니다. `points`가 1이면 `end` 하나만
/// 반환합니다.
pub fn sample_grid(start: DateTime<Utc>, end: DateTime<Utc>, points: usize) -> Vec<DateTime<Utc>> {
    if points == 0 {
        return Vec::new();
    }
    if points == 1 || end <= start {
        return vec![end];
    }

    let step_millis = (end - start).num_milliseconds() / (points as i64 - 1);

    (0..points)
        .map(|k| {
            if k == points - 1 {
                // 나눗셈 반올림 누적 없이 마지막 샘플을 정확히 end로
                end
            } else {
                start + Duration::milliseconds(step_millis * k as i64)
            }
        })
        .collect()
}

/// 주어진 시점의 가격을 backward-fill로 해석합니다.
///
/// `at` 이전(포함)의 가장 최근 포인트를 사용하고, 시계열이 `at` 이후에
/// 시작하면 가장 이른 포인트로 대체합니다.
///
/// # Returns
///
/// 시계열이 비어 있으면 `None`.
pub fn price_at(series: &[PricePoint], at: DateTime<Utc>) -> Option<Decimal> {
    if series.is_empty() {
        return None;
    }

    let idx = series.partition_point(|p| p.timestamp <= at);
    if idx == 0 {
        // 자산에 이 시점 이전 데이터가 없음 → 가장 이른 포인트로 대체
        Some(series[0].price)
    } else {
        Some(series[idx - 1].price)
    }
}
