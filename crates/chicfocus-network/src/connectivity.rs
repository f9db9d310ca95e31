//! 연결 상태 관리.
//!
//! 실시간 채널의 연결/실패를 기록하고, 연속 실패가 임계값에 도달하면
//! 오프라인으로 전환한다. 사용자 알림 여부는 이 상태를 기준으로 결정한다.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// 아직 연결 시도 전
    Idle,
    /// 연결됨
    Connected,
    /// 재연결 시도 중 (임계값 미만 실패)
    Reconnecting,
    /// 오프라인 (임계값 이상 실패)
    Offline,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Idle => write!(f, "Idle"),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Reconnecting => write!(f, "Reconnecting"),
            ConnectionStatus::Offline => write!(f, "Offline"),
        }
    }
}

/// 연결 상태 관리자
pub struct ConnectivityManager {
    /// 연속 실패 횟수
    failure_count: AtomicU32,
    /// 한 번이라도 연결된 적 있는지
    ever_connected: AtomicBool,
    /// 마지막 연결 성공 시각
    last_success: Mutex<Option<DateTime<Utc>>>,
    /// 상태 변경 브로드캐스트
    status_tx: watch::Sender<ConnectionStatus>,
    /// 오프라인 전환 임계값 (연속 실패 횟수)
    offline_threshold: u32,
}

impl ConnectivityManager {
    /// 새 연결 관리자 생성
    ///
    /// `offline_threshold`: 이 횟수만큼 연속 실패하면 오프라인 전환 (최소 1)
    pub fn new(offline_threshold: u32) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::Idle);
        Self {
            failure_count: AtomicU32::new(0),
            ever_connected: AtomicBool::new(false),
            last_success: Mutex::new(None),
            status_tx,
            offline_threshold: offline_threshold.max(1),
        }
    }

    /// 현재 연결 상태
    pub fn status(&self) -> ConnectionStatus {
        *self.status_tx.borrow()
    }

    /// 상태 변경 수신기 생성
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    /// 오프라인 여부 (연속 실패가 임계값 이상)
    pub fn is_offline(&self) -> bool {
        self.status() == ConnectionStatus::Offline
    }

    /// 한 번이라도 연결된 적 있는지
    pub fn has_connected(&self) -> bool {
        self.ever_connected.load(Ordering::Relaxed)
    }

    /// 연결 성공 기록
    pub fn record_success(&self) {
        let was_offline = self.is_offline();
        self.failure_count.store(0, Ordering::Relaxed);
        self.ever_connected.store(true, Ordering::Relaxed);
        *self.last_success.lock() = Some(Utc::now());

        if was_offline {
            info!("서버 연결 복구됨");
        }
        self.status_tx.send_replace(ConnectionStatus::Connected);
    }

    /// 연결 종료 기록 (실패 카운트는 건드리지 않음)
    pub fn record_disconnect(&self) {
        self.status_tx.send_replace(ConnectionStatus::Reconnecting);
    }

    /// 연결 실패 기록, 누적 연속 실패 횟수 반환
    pub fn record_failure(&self) -> u32 {
        let count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("연결 실패 기록 (연속 {count}회)");

        if count >= self.offline_threshold {
            if !self.is_offline() {
                warn!("연속 {count}회 실패 - 오프라인 전환");
            }
            self.status_tx.send_replace(ConnectionStatus::Offline);
        } else {
            self.status_tx.send_replace(ConnectionStatus::Reconnecting);
        }
        count
    }

    /// 연속 실패 횟수
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// 마지막 연결 성공 시각
    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        *self.last_success.lock()
    }
}

/// Arc로 감싼 ConnectivityManager
pub type SharedConnectivityManager = Arc<ConnectivityManager>;
