//! 서버 에러 처리.
//!
//! - [`ApiError`]: REST 핸들러 응답 (`{error, status}` JSON)
//! - [`ServiceError`]: 실시간 요청 처리 실패. 요청한 연결에만 `error{message}`로 전달된다.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chicfocus_core::error::CoreError;
use chicfocus_core::models::identity::Identity;
use chicfocus_storage::StoreError;
use serde::Serialize;
use thiserror::Error;

/// API 에러
#[derive(Debug, Error)]
pub enum ApiError {
    /// 내부 서버 오류
    #[error("내부 서버 오류: {0}")]
    Internal(String),

    /// 리소스를 찾을 수 없음
    #[error("리소스를 찾을 수 없음: {0}")]
    NotFound(String),
}

/// 에러 응답 본문
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// 에러 메시지
    pub error: String,
    /// HTTP 상태 코드
    pub status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = ErrorResponse {
            error: message,
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{resource_type}: {id}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// 실시간 요청 처리 에러
///
/// `Display` 문자열이 그대로 클라이언트 알림 문구가 된다.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 메시지 형식 오류 (알 수 없는 참가자/티어 포함)
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// 빈 작업 이름
    #[error("Missing task name")]
    MissingTaskName,

    /// 하루 세션 한도 초과
    #[error("Daily limit of {0} chickens reached!")]
    DailyLimit(usize),

    /// 다른 참가자의 타이머/챌린지 조작
    #[error("You can only control your own timer!")]
    NotOwner {
        /// 대상 참가자
        user: Identity,
        /// 요청한 참가자
        current_user: Identity,
    },

    /// 일시정지할 타이머 없음
    #[error("No running timer for {0}")]
    NoRunningTimer(Identity),

    /// 재개할 타이머 없음
    #[error("No paused timer for {0}")]
    NoPausedTimer(Identity),

    /// 오늘 제안된 챌린지가 없거나 이미 시작됨
    #[error("No chaos chicken offered for {0} today")]
    ChallengeNotOffered(Identity),

    /// 진행 중인 챌린지 없음
    #[error("No chaos chicken in progress for {0}")]
    ChallengeNotStarted(Identity),

    /// 저장 실패
    #[error("Server error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ApiError::NotFound("차트".to_string());
        assert!(err.to_string().contains("차트"));
    }

    #[test]
    fn core_not_found_maps_to_404() {
        let err: ApiError = CoreError::NotFound {
            resource_type: "Chart".to_string(),
            id: "prices".to_string(),
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn service_messages_are_user_facing() {
        assert_eq!(
            ServiceError::DailyLimit(5).to_string(),
            "Daily limit of 5 chickens reached!"
        );
        assert_eq!(ServiceError::MissingTaskName.to_string(), "Missing task name");
    }
}
