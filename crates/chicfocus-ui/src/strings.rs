//! 화면 문자열.

pub const READY_TO_START: &str = "Ready to start";
pub const IDLE: &str = "Idle";
pub const BREAK_TIME: &str = "Break time! 🐥";
pub const ON_BREAK: &str = "On break 🐥";
pub const SESSION_COMPLETED: &str = "Session completed! 🎉";
pub const COMPLETED_SESSION: &str = "Completed session 🎉";
pub const CHICKEN_DONE: &str = "Great job! Your chicken is done. 🐥";
pub const NO_ACTIVITIES: &str = "No activities yet";
pub const PAUSE_LABEL: &str = "Pause";
pub const RESUME_LABEL: &str = "Resume";
pub const END_CYCLE_CONFIRM: &str = "Are you sure you want to end the current cycle?";

/// 본인 세션 진행 중 상태
pub fn working_on(task_name: &str, tier: u8) -> String {
    format!("Working on: {task_name} (Tier {tier})")
}

/// 상대 세션 진행 중 상태
pub fn partner_working_on(task_name: &str, tier: u8) -> String {
    format!("{task_name} (Tier {tier})")
}

/// 사이클 종료 안내
pub fn cycle_winner(winner: &str) -> String {
    format!("🎉 {winner} wins!\n\n{winner} gets to choose who picks the next date activity.")
}

pub const CYCLE_TIE: &str =
    "It's a tie! Both users have the same points.\nYou'll need to decide together who chooses the next date!";

/// 챌린지 성공 알림
pub fn challenge_won(points: i64) -> String {
    format!("🐔 Chaos chicken conquered! +{points} points")
}

pub const CHALLENGE_LOST: &str = "The chaos chicken got away this time. No bonus points.";

/// 연결 종료 알림
pub fn disconnected(reason: &str) -> String {
    format!("Disconnected from server ({reason}). Reconnecting...")
}

/// 최초 연결 실패 알림
pub fn connect_error(error: &str) -> String {
    format!("Connection error: {error}. Is the server running?")
}

/// 재연결 진행 알림
pub fn reconnecting(attempt: u32) -> String {
    format!("Reconnecting to server... (attempt {attempt})")
}

/// 재연결 포기 알림
pub fn reconnect_gave_up(attempts: u32) -> String {
    format!("Could not reach the server after {attempts} attempts. Please restart the client.")
}

/// 사용자 표시 (본인이면 "(you)")
pub fn user_indicator(name: &str, is_viewer: bool) -> String {
    if is_viewer {
        format!("{name} (you)")
    } else {
        name.to_string()
    }
}
