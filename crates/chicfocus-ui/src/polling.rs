//! 폴링 루프.
//!
//! 고정 간격으로 비동기 작업을 반복하는 tokio 태스크.
//! 시작/정지는 멱등이며, 매 틱은 시작 시점의 세대 번호를 가진 [`PollGuard`]를 받는다.
//! 정지(또는 재시작) 후 도착한 응답은 가드 검사에서 걸러진다.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// 최소 폴링 간격 (`tokio::time::interval`은 0을 받지 않는다)
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// 폴링 세대 가드
#[derive(Debug, Clone)]
pub struct PollGuard {
    generation: Arc<AtomicU64>,
    expected: u64,
}

impl PollGuard {
    /// 이 틱을 시작한 루프가 아직 살아 있는지
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.expected
    }
}

/// 고정 간격 폴링 루프
pub struct PollingLoop {
    name: &'static str,
    interval: Duration,
    generation: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl PollingLoop {
    /// 정지 상태로 생성. 간격은 최소 1ms로 올린다.
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval: interval.max(MIN_INTERVAL),
            generation: Arc::new(AtomicU64::new(0)),
            handle: None,
        }
    }

    /// 실행 중인지
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// 현재 세대의 가드
    pub fn guard(&self) -> PollGuard {
        PollGuard {
            generation: self.generation.clone(),
            expected: self.generation.load(Ordering::Acquire),
        }
    }

    /// 루프 시작. 이미 실행 중이면 아무것도 하지 않는다.
    ///
    /// 첫 틱은 즉시 실행된다. tokio 런타임 안에서 호출해야 한다.
    pub fn start<F, Fut>(&mut self, tick: F)
    where
        F: Fn(PollGuard) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.handle.is_some() {
            debug!("{} 폴링 이미 실행 중", self.name);
            return;
        }

        self.generation.fetch_add(1, Ordering::AcqRel);
        let guard = self.guard();
        let interval = self.interval;
        let name = self.name;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !guard.is_current() {
                    break;
                }
                tick(guard.clone()).await;
            }
            debug!("{name} 폴링 태스크 종료");
        }));
        debug!("{} 폴링 시작 ({:?})", self.name, self.interval);
    }

    /// 루프 정지. 실행 중이 아니면 아무것도 하지 않는다.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.generation.fetch_add(1, Ordering::AcqRel);
        handle.abort();
        debug!("{} 폴링 정지", self.name);
    }
}

impl Drop for PollingLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
