//! 실시간 연결 감독자.
//!
//! 연결 → 수신 이벤트 전달 → 종료 감지 → 백오프 재연결을 반복한다.
//! 연속 실패가 알림 임계값에 도달하면 실패 보고에 `surfaced`를 표시하고,
//! 재시도 한도를 넘으면 `on_reconnect_exhausted`를 호출한 뒤 종료한다.

use chicfocus_core::config::AppConfig;
use chicfocus_core::models::protocol::ServerEvent;
use chicfocus_core::ports::realtime::{ConnectFailure, DisconnectReason, RealtimeHandler};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::connectivity::{ConnectivityManager, SharedConnectivityManager};
use crate::reconnect::ReconnectPolicy;
use crate::transport::WsTransport;
use crate::ws_client::{WsClient, WsMessage, WsSender};

/// 한 연결 세션의 종료 결과
enum SessionEnd {
    /// 연결이 끊김 (재연결 대상)
    Dropped(DisconnectReason),
    /// 종료 신호 수신
    Shutdown,
}

/// 실시간 연결 감독자
pub struct RealtimeConnection {
    client: WsClient,
    transport: Arc<WsTransport>,
    policy: ReconnectPolicy,
    connectivity: SharedConnectivityManager,
}

impl RealtimeConnection {
    /// 새 감독자 생성
    ///
    /// `notify_after_failures`: 실패를 사용자에게 알리기 시작하는 연속 실패 횟수
    pub fn new(client: WsClient, policy: ReconnectPolicy, notify_after_failures: u32) -> Self {
        Self {
            client,
            transport: Arc::new(WsTransport::new()),
            policy,
            connectivity: Arc::new(ConnectivityManager::new(notify_after_failures)),
        }
    }

    /// 설정에서 감독자 생성
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            WsClient::new(&config.server.base_url, &config.server.ws_path),
            ReconnectPolicy::from_config(&config.reconnect),
            config.reconnect.notify_after_failures,
        )
    }

    /// 송신 어댑터 (UI 어댑터에 주입)
    pub fn transport(&self) -> Arc<WsTransport> {
        self.transport.clone()
    }

    /// 연결 상태 관리자
    pub fn connectivity(&self) -> SharedConnectivityManager {
        self.connectivity.clone()
    }

    /// 감독 루프 실행
    ///
    /// `shutdown`이 true가 되거나 재시도 한도를 넘으면 반환한다.
    pub async fn run(self, handler: Arc<dyn RealtimeHandler>, mut shutdown: watch::Receiver<bool>) {
        info!("실시간 연결 감독 시작: {}", self.client.ws_url());

        loop {
            if *shutdown.borrow() {
                break;
            }

            let connected = tokio::select! {
                result = self.client.connect() => result,
                _ = shutdown.changed() => break,
            };

            match connected {
                Ok((sender, rx)) => {
                    self.connectivity.record_success();
                    self.transport.attach(sender.clone());
                    handler.on_connected();

                    let end = Self::pump(&sender, rx, handler.as_ref(), &mut shutdown).await;
                    self.transport.detach();

                    match end {
                        SessionEnd::Shutdown => {
                            handler.on_disconnected(&DisconnectReason::ClientClosed);
                            break;
                        }
                        SessionEnd::Dropped(reason) => {
                            info!("실시간 연결 종료: {reason}");
                            self.connectivity.record_disconnect();
                            handler.on_disconnected(&reason);
                            if !Self::wait(self.policy.delay_for(1), &mut shutdown).await {
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    let attempt = self.connectivity.record_failure();
                    let failure = ConnectFailure {
                        attempt,
                        error: e.to_string(),
                        surfaced: self.connectivity.is_offline(),
                        was_connected: self.connectivity.has_connected(),
                    };
                    debug!("연결 실패 #{attempt}: {}", failure.error);
                    handler.on_connect_failed(&failure);

                    if self.policy.is_exhausted(attempt) {
                        warn!("재연결 {attempt}회 실패 - 포기");
                        handler.on_reconnect_exhausted(attempt);
                        break;
                    }
                    if !Self::wait(self.policy.delay_for(attempt), &mut shutdown).await {
                        break;
                    }
                }
            }
        }

        info!("실시간 연결 감독 종료");
    }

    /// 연결 하나의 수신 메시지를 핸들러로 전달
    async fn pump(
        sender: &WsSender,
        mut rx: mpsc::Receiver<WsMessage>,
        handler: &dyn RealtimeHandler,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionEnd {
        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(WsMessage::Text(text)) => match ServerEvent::from_json(&text) {
                        Ok(event) => {
                            debug!("이벤트 수신: {}", event.name());
                            handler.on_event(event);
                        }
                        Err(e) => warn!("알 수 없는 메시지 무시: {e}"),
                    },
                    Some(WsMessage::Binary(data)) => {
                        debug!("바이너리 메시지 무시 ({} bytes)", data.len());
                    }
                    Some(WsMessage::Close) => {
                        return SessionEnd::Dropped(DisconnectReason::ServerClosed)
                    }
                    None => {
                        return SessionEnd::Dropped(DisconnectReason::TransportError(
                            "수신 스트림 종료".to_string(),
                        ))
                    }
                },
                _ = shutdown.changed() => {
                    if let Err(e) = sender.close().await {
                        debug!("종료 프레임 전송 실패: {e}");
                    }
                    return SessionEnd::Shutdown;
                }
            }
        }
    }

    /// 재시도 대기. 종료 신호가 오면 false.
    async fn wait(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => !*shutdown.borrow(),
            _ = shutdown.changed() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chicfocus_core::ports::realtime::RealtimeTransport;
    use futures::SinkExt;
    use parking_lot::Mutex;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    #[derive(Default)]
    struct Recorder {
        log: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn entries(&self) -> Vec<String> {
            self.log.lock().clone()
        }
    }

    impl RealtimeHandler for Recorder {
        fn on_connected(&self) {
            self.log.lock().push("connected".into());
        }
        fn on_disconnected(&self, reason: &DisconnectReason) {
            self.log.lock().push(format!("disconnected:{reason}"));
        }
        fn on_connect_failed(&self, failure: &ConnectFailure) {
            self.log
                .lock()
                .push(format!("failed:{}:{}", failure.attempt, failure.surfaced));
        }
        fn on_reconnect_exhausted(&self, attempts: u32) {
            self.log.lock().push(format!("exhausted:{attempts}"));
        }
        fn on_event(&self, event: ServerEvent) {
            self.log.lock().push(format!("event:{}", event.name()));
        }
    }

    fn fast_policy(max_attempts: u32) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            max_attempts: Some(max_attempts),
        }
    }

    async fn unused_addr() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let addr = unused_addr().await;
        let connection = RealtimeConnection::new(
            WsClient::new(&format!("http://{addr}"), "/ws"),
            fast_policy(3),
            2,
        );
        let recorder = Arc::new(Recorder::default());
        let (_tx, rx) = watch::channel(false);

        tokio::time::timeout(Duration::from_secs(5), connection.run(recorder.clone(), rx))
            .await
            .unwrap();

        assert_eq!(
            recorder.entries(),
            vec!["failed:1:false", "failed:2:true", "failed:3:true", "exhausted:3"]
        );
    }

    #[tokio::test]
    async fn forwards_events_and_reports_server_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(listener);
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::text(
                r#"{"event":"server_connected","data":{"status":"Connected"}}"#.to_string(),
            ))
            .await
            .unwrap();
            ws.close(None).await.unwrap();
        });

        let connection = RealtimeConnection::new(
            WsClient::new(&format!("http://{addr}"), "/ws"),
            fast_policy(1),
            3,
        );
        let transport = connection.transport();
        let recorder = Arc::new(Recorder::default());
        let (_tx, rx) = watch::channel(false);

        tokio::time::timeout(Duration::from_secs(5), connection.run(recorder.clone(), rx))
            .await
            .unwrap();

        let entries = recorder.entries();
        assert_eq!(entries[0], "connected");
        assert_eq!(entries[1], "event:server_connected");
        assert_eq!(entries[2], "disconnected:server disconnect");
        assert_eq!(entries.last().map(String::as_str), Some("exhausted:1"));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn shutdown_during_backoff_stops_loop() {
        let addr = unused_addr().await;
        let connection = RealtimeConnection::new(
            WsClient::new(&format!("http://{addr}"), "/ws"),
            ReconnectPolicy {
                initial_delay: Duration::from_secs(60),
                max_delay: Duration::from_secs(60),
                max_attempts: None,
            },
            3,
        );
        let recorder = Arc::new(Recorder::default());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(connection.run(recorder.clone(), rx));
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recorder.entries(), vec!["failed:1:false"]);
    }
}
