//! UI 어댑터 에러.
//!
//! 로컬 검증 거부는 사용자에게 그대로 보여줄 문구를 메시지로 가진다.

use chicfocus_core::error::CoreError;
use thiserror::Error;

/// 사용자 액션 처리 에러
#[derive(Debug, Error)]
pub enum UiError {
    /// 사용자 미선택
    #[error("Please select who you are first.")]
    NoUserSelected,

    /// 다른 참가자의 세션 시작 시도
    #[error("You can only start chickens for your own user!")]
    NotOwnIdentity,

    /// 다른 참가자의 타이머 조작 시도
    #[error("You can only control your own timer!")]
    NotOwnTimer,

    /// 다른 참가자의 챌린지 조작 시도
    #[error("You can only take on your own chaos chicken!")]
    NotOwnChallenge,

    /// 티어 미선택
    #[error("Please select a chicken tier.")]
    MissingTier,

    /// 티어 값 오류
    #[error("Invalid tier: {0}")]
    InvalidTier(String),

    /// 작업 이름 미입력
    #[error("Please enter a task name!")]
    MissingTaskName,

    /// 실시간 채널 미연결
    #[error("Not connected to server. Please wait for the connection and try again.")]
    NotConnected,

    /// 사용자가 확인 대화상자에서 취소
    #[error("cancelled")]
    Cancelled,

    /// 전송 실패
    #[error("Could not reach the server: {0}")]
    Transport(#[from] CoreError),
}

impl UiError {
    /// 사용자에게 알림으로 보여줄지
    pub fn should_alert(&self) -> bool {
        !matches!(self, UiError::Cancelled)
    }
}
