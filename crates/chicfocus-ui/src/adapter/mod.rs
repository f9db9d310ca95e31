//! 실시간 UI 어댑터.
//!
//! 수신 이벤트는 [`inbound`] 핸들러 테이블로, 사용자 액션은 [`outbound`] 검증 후
//! `RealtimeTransport`로 보낸다. 세션과 화면은 짧게 잡는 `parking_lot::Mutex` 뒤에 있고,
//! 락은 항상 세션 → 화면 순서로 잡으며 `.await`를 넘겨 들고 있지 않는다.

mod inbound;
mod outbound;

use chicfocus_core::models::identity::Identity;
use chicfocus_core::models::protocol::ServerEvent;
use chicfocus_core::ports::realtime::{
    ConnectFailure, DisconnectReason, RealtimeHandler, RealtimeTransport,
};
use chicfocus_core::ports::view::View;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::elements::*;
use crate::session::ClientSession;
use crate::strings;

/// 공유 클라이언트 세션
pub type SharedSession = Arc<Mutex<ClientSession>>;

/// 공유 화면
pub type SharedView<V> = Arc<Mutex<V>>;

/// 실시간 UI 어댑터
pub struct RealtimeUiAdapter<V: View> {
    session: SharedSession,
    view: SharedView<V>,
    transport: Arc<dyn RealtimeTransport>,
    /// 최초 연결 실패 알림을 이미 띄웠는지
    connect_alerted: AtomicBool,
}

impl<V: View> RealtimeUiAdapter<V> {
    /// 새 어댑터 생성 (사용자 미선택 상태)
    pub fn new(view: V, transport: Arc<dyn RealtimeTransport>) -> Self {
        Self::with_shared(
            Arc::new(Mutex::new(ClientSession::new())),
            Arc::new(Mutex::new(view)),
            transport,
        )
    }

    /// 세션/화면을 다른 구성요소와 공유하며 생성
    pub fn with_shared(
        session: SharedSession,
        view: SharedView<V>,
        transport: Arc<dyn RealtimeTransport>,
    ) -> Self {
        Self {
            session,
            view,
            transport,
            connect_alerted: AtomicBool::new(false),
        }
    }

    /// 공유 세션
    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    /// 공유 화면
    pub fn view(&self) -> SharedView<V> {
        self.view.clone()
    }

    /// 현재 사용자
    pub fn current_user(&self) -> Option<Identity> {
        self.session.lock().current_user()
    }

    /// 서버 이벤트 처리
    pub fn handle_event(&self, event: ServerEvent) {
        debug!("이벤트 처리: {}", event.name());
        let mut session = self.session.lock();
        let mut view = self.view.lock();
        inbound::apply(&mut *session, &mut *view, event);
    }

    /// 사용자 선택 (로컬 전용)
    pub fn select_user(&self, user: Identity) {
        let mut session = self.session.lock();
        session.select_user(user);

        let mut view = self.view.lock();
        view.set_hidden(USER_MODAL, true);
        view.set_hidden(MAIN_APP, false);
        for identity in Identity::ALL {
            let is_viewer = identity == user;
            if is_viewer {
                view.add_class(&el(identity, SIDE), CURRENT_USER_SIDE_CLASS);
            } else {
                view.remove_class(&el(identity, SIDE), CURRENT_USER_SIDE_CLASS);
            }
            view.set_text(
                &el(identity, USER_INDICATOR),
                &strings::user_indicator(identity.as_str(), is_viewer),
            );
        }
        info!("사용자 선택: {user}");
    }

    /// 로그아웃 (세션 전체 초기화)
    pub fn logout(&self) {
        let mut session = self.session.lock();
        session.logout();

        let mut view = self.view.lock();
        view.set_hidden(USER_MODAL, false);
        view.set_hidden(MAIN_APP, true);
        info!("로그아웃");
    }

    fn reject(&self, error: &crate::error::UiError) {
        if error.should_alert() {
            self.view.lock().alert(&error.to_string());
        }
    }
}

impl<V: View> RealtimeHandler for RealtimeUiAdapter<V> {
    fn on_connected(&self) {
        self.connect_alerted.store(false, Ordering::Relaxed);
        self.view.lock().add_class(BODY, SOCKET_CONNECTED_CLASS);
    }

    fn on_disconnected(&self, reason: &DisconnectReason) {
        let mut view = self.view.lock();
        view.remove_class(BODY, SOCKET_CONNECTED_CLASS);
        if !reason.is_expected() {
            view.notify(&strings::disconnected(&reason.to_string()));
        }
    }

    fn on_connect_failed(&self, failure: &ConnectFailure) {
        let mut view = self.view.lock();
        view.remove_class(BODY, SOCKET_CONNECTED_CLASS);
        if !failure.surfaced {
            return;
        }
        if !failure.was_connected && !self.connect_alerted.swap(true, Ordering::Relaxed) {
            view.alert(&strings::connect_error(&failure.error));
        } else {
            view.notify(&strings::reconnecting(failure.attempt));
        }
    }

    fn on_reconnect_exhausted(&self, attempts: u32) {
        let mut view = self.view.lock();
        view.remove_class(BODY, SOCKET_CONNECTED_CLASS);
        view.alert(&strings::reconnect_gave_up(attempts));
    }

    fn on_event(&self, event: ServerEvent) {
        self.handle_event(event);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use chicfocus_core::error::CoreError;
    use chicfocus_core::models::protocol::ClientEvent;
    use chicfocus_core::ports::realtime::RealtimeTransport;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// 보낸 이벤트를 기록하는 송신기
    #[derive(Default)]
    pub struct RecordingTransport {
        pub disconnected: AtomicBool,
        pub sent: Mutex<Vec<ClientEvent>>,
    }

    impl RecordingTransport {
        pub fn sent(&self) -> Vec<ClientEvent> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl RealtimeTransport for RecordingTransport {
        fn is_connected(&self) -> bool {
            !self.disconnected.load(Ordering::Relaxed)
        }

        async fn emit(&self, event: &ClientEvent) -> Result<(), CoreError> {
            if !self.is_connected() {
                return Err(CoreError::NotConnected);
            }
            self.sent.lock().push(event.clone());
            Ok(())
        }
    }
}
