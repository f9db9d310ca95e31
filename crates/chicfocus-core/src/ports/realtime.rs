//! 실시간 채널 포트.
//!
//! 구현: `chicfocus-network` crate (tokio-tungstenite)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::protocol::{ClientEvent, ServerEvent};

/// 연결 종료 사유
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// 로컬에서 의도적으로 닫음 (로그아웃, 종료)
    ClientClosed,
    /// 서버가 닫음
    ServerClosed,
    /// 전송 계층 에러
    TransportError(String),
}

impl DisconnectReason {
    /// 사용자가 예상할 수 있는 종료인지 (알림 생략 대상)
    pub fn is_expected(&self) -> bool {
        matches!(self, DisconnectReason::ClientClosed)
    }
}

impl std::fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisconnectReason::ClientClosed => write!(f, "client disconnect"),
            DisconnectReason::ServerClosed => write!(f, "server disconnect"),
            DisconnectReason::TransportError(e) => write!(f, "transport error: {e}"),
        }
    }
}

/// 연결 실패 보고
#[derive(Debug, Clone)]
pub struct ConnectFailure {
    /// 연속 실패 횟수 (1부터)
    pub attempt: u32,
    /// 실패 메시지
    pub error: String,
    /// 사용자에게 알릴 임계값을 넘었는지
    pub surfaced: bool,
    /// 이전에 한 번이라도 연결된 적이 있는지
    pub was_connected: bool,
}

/// 실시간 메시지 송신 인터페이스
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    /// 현재 연결 여부
    fn is_connected(&self) -> bool;

    /// 이벤트 송신
    async fn emit(&self, event: &ClientEvent) -> Result<(), CoreError>;
}

/// 실시간 채널 수신 측 인터페이스
///
/// 연결 감독자가 호출하며, 모든 메서드는 즉시 완료된다.
pub trait RealtimeHandler: Send + Sync {
    /// 연결 수립
    fn on_connected(&self);

    /// 연결 종료
    fn on_disconnected(&self, reason: &DisconnectReason);

    /// 연결 시도 실패
    fn on_connect_failed(&self, failure: &ConnectFailure);

    /// 재연결 시도 한도 초과
    fn on_reconnect_exhausted(&self, attempts: u32);

    /// 서버 이벤트 수신
    fn on_event(&self, event: ServerEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_client_close_is_expected() {
        assert!(DisconnectReason::ClientClosed.is_expected());
        assert!(!DisconnectReason::ServerClosed.is_expected());
        assert!(!DisconnectReason::TransportError("reset".into()).is_expected());
    }
}
