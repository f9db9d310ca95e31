//! 실시간 송신 어댑터.
//!
//! `RealtimeTransport` 포트 구현. 연결 감독자가 연결될 때마다 송신기를 붙이고
//! 끊기면 떼어낸다. UI 어댑터는 이 객체 하나만 들고 있으면 된다.

use async_trait::async_trait;
use chicfocus_core::error::CoreError;
use chicfocus_core::models::protocol::ClientEvent;
use chicfocus_core::ports::realtime::RealtimeTransport;
use parking_lot::RwLock;
use tracing::debug;

use crate::ws_client::WsSender;

/// WebSocket 기반 `RealtimeTransport`
#[derive(Debug, Default)]
pub struct WsTransport {
    sender: RwLock<Option<WsSender>>,
}

impl WsTransport {
    /// 연결되지 않은 상태로 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 연결의 송신기 연결
    pub fn attach(&self, sender: WsSender) {
        *self.sender.write() = Some(sender);
    }

    /// 송신기 분리 (연결 종료)
    pub fn detach(&self) {
        *self.sender.write() = None;
    }
}

#[async_trait]
impl RealtimeTransport for WsTransport {
    fn is_connected(&self) -> bool {
        self.sender.read().is_some()
    }

    async fn emit(&self, event: &ClientEvent) -> Result<(), CoreError> {
        // 락은 await 전에 해제
        let sender = self.sender.read().clone().ok_or(CoreError::NotConnected)?;
        let json = event.to_json()?;
        debug!("이벤트 송신: {}", event.name());
        sender.send_text(&json).await
    }
}
