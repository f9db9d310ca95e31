//! 실시간 채널 와이어 프로토콜.
//!
//! 모든 메시지는 JSON 텍스트 프레임 `{"event": <이름>, "data": {...}}` 형식이다.
//! 데이터가 없는 이벤트(`end_cycle`)는 `data`를 생략한다.

use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::scoreboard::{CycleWinner, ScoreboardSnapshot};
use super::tier::Tier;
use crate::error::CoreError;

/// 서버 → 클라이언트 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// 연결 확인
    ServerConnected { status: String },
    /// 세션 시작됨
    ChickenStarted {
        user: Identity,
        task_name: String,
        tier: Tier,
        /// 세션 길이 (초)
        duration: u64,
    },
    /// 타이머 틱
    TimerUpdate {
        user: Identity,
        /// `MM:SS`
        time: String,
        #[serde(default)]
        remaining: u64,
        #[serde(default)]
        is_break: bool,
    },
    /// 일시정지됨
    TimerPaused { user: Identity },
    /// 재개됨
    TimerResumed { user: Identity },
    /// 초기화됨
    TimerReset { user: Identity },
    /// 휴식 시작
    BreakStarted { user: Identity },
    /// 세션(작업 + 휴식) 완료
    SessionComplete { user: Identity },
    /// 전체 점수판 스냅샷
    FullUpdate(ScoreboardSnapshot),
    /// 사이클 종료
    CycleComplete {
        winner: CycleWinner,
        #[serde(default)]
        luu_points: i64,
        #[serde(default)]
        keni_points: i64,
    },
    /// 챌린지 제안됨
    ChaosChickenOffered { user: Identity, description: String },
    /// 챌린지 시작됨
    ChaosChickenStarted { user: Identity, description: String },
    /// 챌린지 종료
    ChaosChickenCompleted {
        user: Identity,
        success: bool,
        #[serde(default)]
        points_earned: i64,
    },
    /// 요청 처리 실패 (요청한 클라이언트에게만 전송)
    Error { message: String },
}

impl ServerEvent {
    /// 이벤트 이름 (로그용)
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::ServerConnected { .. } => "server_connected",
            ServerEvent::ChickenStarted { .. } => "chicken_started",
            ServerEvent::TimerUpdate { .. } => "timer_update",
            ServerEvent::TimerPaused { .. } => "timer_paused",
            ServerEvent::TimerResumed { .. } => "timer_resumed",
            ServerEvent::TimerReset { .. } => "timer_reset",
            ServerEvent::BreakStarted { .. } => "break_started",
            ServerEvent::SessionComplete { .. } => "session_complete",
            ServerEvent::FullUpdate(_) => "full_update",
            ServerEvent::CycleComplete { .. } => "cycle_complete",
            ServerEvent::ChaosChickenOffered { .. } => "chaos_chicken_offered",
            ServerEvent::ChaosChickenStarted { .. } => "chaos_chicken_started",
            ServerEvent::ChaosChickenCompleted { .. } => "chaos_chicken_completed",
            ServerEvent::Error { .. } => "error",
        }
    }

    /// 이벤트가 가리키는 참가자 (해당 없으면 None)
    pub fn user(&self) -> Option<Identity> {
        match self {
            ServerEvent::ChickenStarted { user, .. }
            | ServerEvent::TimerUpdate { user, .. }
            | ServerEvent::TimerPaused { user }
            | ServerEvent::TimerResumed { user }
            | ServerEvent::TimerReset { user }
            | ServerEvent::BreakStarted { user }
            | ServerEvent::SessionComplete { user }
            | ServerEvent::ChaosChickenOffered { user, .. }
            | ServerEvent::ChaosChickenStarted { user, .. }
            | ServerEvent::ChaosChickenCompleted { user, .. } => Some(*user),
            _ => None,
        }
    }

    /// JSON 텍스트 프레임 디코딩
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(text)?)
    }

    /// JSON 텍스트 프레임 인코딩
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 클라이언트 → 서버 이벤트
///
/// 모든 참가자 대상 요청은 보내는 쪽의 `current_user`를 함께 싣는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// 세션 시작 요청
    StartChicken {
        user: Identity,
        task_name: String,
        tier: Tier,
        current_user: Identity,
    },
    /// 일시정지 요청
    PauseTimer { user: Identity, current_user: Identity },
    /// 재개 요청
    ResumeTimer {
        user: Identity,
        #[serde(default)]
        is_break: bool,
        current_user: Identity,
    },
    /// 초기화 요청
    ResetTimer { user: Identity, current_user: Identity },
    /// 사이클 종료 요청
    EndCycle,
    /// 챌린지 시작 요청
    StartChaosChicken { user: Identity, current_user: Identity },
    /// 챌린지 완료 보고
    CompleteChaosChicken {
        user: Identity,
        current_user: Identity,
        success: bool,
    },
}

impl ClientEvent {
    /// 이벤트 이름 (로그용)
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::StartChicken { .. } => "start_chicken",
            ClientEvent::PauseTimer { .. } => "pause_timer",
            ClientEvent::ResumeTimer { .. } => "resume_timer",
            ClientEvent::ResetTimer { .. } => "reset_timer",
            ClientEvent::EndCycle => "end_cycle",
            ClientEvent::StartChaosChicken { .. } => "start_chaos_chicken",
            ClientEvent::CompleteChaosChicken { .. } => "complete_chaos_chicken",
        }
    }

    /// JSON 텍스트 프레임 디코딩
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(text)?)
    }

    /// JSON 텍스트 프레임 인코딩
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}
