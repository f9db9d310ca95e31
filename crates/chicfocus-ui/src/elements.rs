//! 화면 요소 id.
//!
//! 참가자별 요소는 `{element_key}-{suffix}` 형식이다 (예: `keni-timer`).

use chicfocus_core::models::identity::Identity;

pub const BODY: &str = "body";
pub const USER_MODAL: &str = "user-modal";
pub const MAIN_APP: &str = "main-app";
pub const DAYS_REMAINING: &str = "days-remaining";
pub const SHARED_LOG: &str = "shared-log";
pub const MARKET_VIEW: &str = "market-view";
pub const MARKET_FEED: &str = "market-feed";
pub const MARKET_CHART: &str = "market-chart";
pub const MARKET_POPUP: &str = "market-popup";

pub const TIMER_DISPLAY: &str = "timer-display";
pub const TIMER: &str = "timer";
pub const TIMER_STATUS: &str = "timer-status";
pub const STATUS: &str = "status";
pub const START_BTN: &str = "start-btn";
pub const PAUSE_BTN: &str = "pause-btn";
pub const RESET_BTN: &str = "reset-btn";
pub const TASK_NAME: &str = "task-name";
pub const TIER: &str = "tier";
pub const POINTS: &str = "points";
pub const SESSIONS: &str = "sessions";
pub const SIDE: &str = "side";
pub const USER_INDICATOR: &str = "user-indicator";
pub const CHALLENGE_PANEL: &str = "challenge-panel";
pub const CHALLENGE_DESC: &str = "challenge-desc";
pub const CHALLENGE_START_BTN: &str = "challenge-start-btn";
pub const CHALLENGE_COMPLETE_BTN: &str = "challenge-complete-btn";
pub const CHALLENGE_FAIL_BTN: &str = "challenge-fail-btn";

/// 연결 상태 표시 클래스 (`body`)
pub const SOCKET_CONNECTED_CLASS: &str = "socket-connected";

/// 현재 사용자 쪽 강조 클래스 (`{k}-side`)
pub const CURRENT_USER_SIDE_CLASS: &str = "current-user-side";

/// 피드에 처음 나타난 항목 클래스
pub const NEW_ITEM_CLASS: &str = "new";

/// 참가자별 요소 id
pub fn el(identity: Identity, suffix: &str) -> String {
    format!("{}-{}", identity.element_key(), suffix)
}

/// 참가자 요소 id인지 (접두사 검사)
pub fn belongs_to(id: &str, identity: Identity) -> bool {
    id.strip_prefix(identity.element_key())
        .is_some_and(|rest| rest.starts_with('-'))
}
