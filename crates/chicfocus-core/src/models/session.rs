//! 집중 세션 모델.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::tier::Tier;

/// 집중 세션 하나 (치킨)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    /// 작업 이름
    pub task_name: String,
    /// 세션 티어
    pub tier: Tier,
    /// 시작 시각
    pub timestamp: DateTime<Utc>,
    /// 작업 타이머 완료 여부
    #[serde(default)]
    pub completed: bool,
}

impl FocusSession {
    /// 지금 시작하는 미완료 세션 생성
    pub fn begin(task_name: impl Into<String>, tier: Tier) -> Self {
        Self {
            task_name: task_name.into(),
            tier,
            timestamp: Utc::now(),
            completed: false,
        }
    }

    /// 로컬 달력 기준 오늘 시작된 세션인지
    pub fn is_today(&self) -> bool {
        self.timestamp.with_timezone(&Local).date_naive() == Local::now().date_naive()
    }
}

/// 활동 로그용 (참가자 포함) 세션
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedSession {
    /// 세션 소유자
    pub user: Identity,
    /// 세션
    pub session: FocusSession,
}

/// 남은 초를 `MM:SS` 문자열로 변환
pub fn format_clock(total_secs: u64) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// 타이머 초기화 상태 표시값
pub const ZERO_CLOCK: &str = "00:00";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), ZERO_CLOCK);
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(45 * 60), "45:00");
    }

    #[test]
    fn new_session_is_today() {
        let session = FocusSession::begin("write report", Tier::Light);
        assert!(session.is_today());
        assert!(!session.completed);
    }

    #[test]
    fn completed_defaults_to_false() {
        let json = r#"{"task_name":"a","tier":1,"timestamp":"2024-01-30T12:00:00Z"}"#;
        let session: FocusSession = serde_json::from_str(json).unwrap();
        assert!(!session.completed);
    }
}
