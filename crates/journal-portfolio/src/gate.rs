//! 재구성 요청 세대(generation) 게이트.
//!
//! 사용자가 요청 윈도우를 바꾸는 등 새 재구성이 시작되면 이전 재구성은
//! 즉시 취소되어야 하고, 뒤늦게 완료된 이전 세대의 결과가 최신 결과를
//! 덮어쓰면 안 됩니다. 요청 시작 순서 기준 last-writer-wins로는 부족하므로
//! 세대 카운터를 결과 커밋 전에 명시적으로 확인합니다.
//!
//! (사용자, 세션)별 "현재 요청" 하나당 게이트 하나를 두는 것이 호출자의
//! 책임입니다. 게이트 자체는 결과를 저장하지 않습니다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

/// 재구성 요청 세대 게이트.
#[derive(Debug)]
pub struct ReconstructionGate {
    /// 현재 세대 번호 (begin마다 증가)
    generation: AtomicU64,
    /// 현재 세대의 취소 토큰
    live: Mutex<CancellationToken>,
}

/// 한 번의 재구성 요청에 대한 티켓.
#[derive(Debug, Clone)]
pub struct ReconstructionTicket {
    generation: u64,
    cancel: CancellationToken,
}

impl ReconstructionGate {
    /// 새 게이트를 생성합니다.
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            live: Mutex::new(CancellationToken::new()),
        }
    }

    /// 새 요청을 시작합니다.
    ///
    /// 이전 요청의 토큰을 취소하고, 새 세대 번호와 취소 토큰이 담긴
    /// 티켓을 발급합니다.
    pub fn begin(&self) -> ReconstructionTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();

        {
            let mut live = self.live.lock().expect("gate lock poisoned");
            live.cancel();
            *live = token.clone();
        }

        ReconstructionTicket {
            generation,
            cancel: token,
        }
    }

    /// 티켓이 여전히 최신 세대인지 확인합니다.
    ///
    /// 결과를 커밋하기 전에 반드시 확인해야 합니다. `false`이면 더 새로운
    /// 요청이 이미 시작된 것이므로 결과를 버려야 합니다.
    pub fn is_current(&self, ticket: &ReconstructionTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }
}

impl Default for ReconstructionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconstructionTicket {
    /// 세대 번호.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 이 요청의 취소 토큰.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}
