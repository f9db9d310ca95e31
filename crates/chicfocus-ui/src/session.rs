//! 클라이언트 세션 상태.
//!
//! 현재 사용자, 참가자별 타이머 플래그, 마켓 폴링 커서를 한곳에 둔다.
//! 사용자 선택과 로그아웃은 전체 상태를 초기화한다.

use chicfocus_core::models::identity::Identity;
use std::collections::{BTreeMap, HashSet};

/// 참가자 타이머 플래그 (수신 이벤트로만 변경)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerFlags {
    pub is_running: bool,
    pub is_paused: bool,
    pub is_break: bool,
}

impl TimerFlags {
    /// 실행 중 (일시정지/휴식 아님)
    pub fn running() -> Self {
        Self {
            is_running: true,
            ..Self::default()
        }
    }
}

/// 마켓 폴링 커서
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketCursor {
    /// 마지막으로 팝업을 띄운 이벤트 시각
    pub last_event_time: Option<String>,
    /// 직전 피드 렌더링에 포함된 id
    pub rendered_feed_ids: HashSet<u64>,
}

/// 클라이언트 세션
#[derive(Debug, Clone, Default)]
pub struct ClientSession {
    current_user: Option<Identity>,
    timers: BTreeMap<Identity, TimerFlags>,
    /// 마켓 폴링 커서
    pub market: MarketCursor,
}

impl ClientSession {
    /// 사용자 미선택 상태로 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 사용자
    pub fn current_user(&self) -> Option<Identity> {
        self.current_user
    }

    /// 현재 사용자의 상대
    pub fn partner_user(&self) -> Option<Identity> {
        self.current_user.map(|user| user.partner())
    }

    /// 해당 참가자가 현재 사용자인지
    pub fn is_viewer(&self, identity: Identity) -> bool {
        self.current_user == Some(identity)
    }

    /// 사용자 선택 (이전 상태는 모두 초기화)
    pub fn select_user(&mut self, identity: Identity) {
        *self = Self {
            current_user: Some(identity),
            ..Self::default()
        };
    }

    /// 로그아웃
    pub fn logout(&mut self) {
        *self = Self::default();
    }

    /// 타이머 플래그
    pub fn flags(&self, identity: Identity) -> TimerFlags {
        self.timers.get(&identity).copied().unwrap_or_default()
    }

    /// 타이머 플래그 (수정용)
    pub fn flags_mut(&mut self, identity: Identity) -> &mut TimerFlags {
        self.timers.entry(identity).or_default()
    }

    /// 타이머 플래그 초기화
    pub fn clear_flags(&mut self, identity: Identity) {
        self.timers.remove(&identity);
    }
}
