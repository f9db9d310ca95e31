//! 참가자별 카운트다운 상태.
//!
//! 카운트다운 태스크는 시작 시점의 세대 번호를 들고 돈다. 일시정지/초기화/재시작은
//! 세대를 올려 이전 태스크의 상태 변경을 무효화하고 태스크를 abort 한다.

use chicfocus_core::models::identity::Identity;
use chicfocus_core::models::session::FocusSession;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tokio::task::JoinHandle;

/// 외부에 노출되는 타이머 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerState {
    /// 남은 초
    pub remaining: u64,
    /// 휴식 타이머인지
    pub is_break: bool,
    /// 카운트다운 진행 중인지
    pub running: bool,
    /// 진행 중인 작업 세션이 있는지
    pub has_session: bool,
}

/// 카운트다운 종료 결과
#[derive(Debug)]
pub struct Finished {
    /// 휴식 타이머였는지
    pub is_break: bool,
    /// 작업 타이머였다면 완료된 세션
    pub session: Option<FocusSession>,
}

#[derive(Default)]
struct UserTimer {
    session: Option<FocusSession>,
    remaining: u64,
    is_break: bool,
    running: bool,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl UserTimer {
    fn invalidate(&mut self) {
        self.generation += 1;
        self.running = false;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// 참가자별 타이머 레지스트리
#[derive(Default)]
pub struct TimerRegistry {
    timers: Mutex<BTreeMap<Identity, UserTimer>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 카운트다운 시작. 기존 카운트다운은 중단된다.
    ///
    /// 반환된 세대 번호로 태스크를 [`attach`](Self::attach) 해야 한다.
    pub fn begin(
        &self,
        user: Identity,
        session: Option<FocusSession>,
        secs: u64,
        is_break: bool,
    ) -> u64 {
        let mut timers = self.timers.lock();
        let timer = timers.entry(user).or_default();
        timer.invalidate();
        timer.session = session;
        timer.remaining = secs;
        timer.is_break = is_break;
        timer.running = true;
        timer.generation
    }

    /// 카운트다운 태스크 등록. 세대가 이미 바뀌었으면 태스크를 중단한다.
    pub fn attach(&self, user: Identity, generation: u64, handle: JoinHandle<()>) {
        let mut timers = self.timers.lock();
        match timers.get_mut(&user) {
            Some(timer) if timer.generation == generation && timer.running => {
                timer.handle = Some(handle);
            }
            _ => handle.abort(),
        }
    }

    /// 현재 세대의 남은 초 (세대가 바뀌었으면 None)
    pub fn remaining(&self, user: Identity, generation: u64) -> Option<u64> {
        let timers = self.timers.lock();
        timers
            .get(&user)
            .filter(|t| t.generation == generation && t.running)
            .map(|t| t.remaining)
    }

    /// 1초 경과 처리. 새 남은 초 반환 (세대가 바뀌었으면 None)
    pub fn tick(&self, user: Identity, generation: u64) -> Option<u64> {
        let mut timers = self.timers.lock();
        let timer = timers
            .get_mut(&user)
            .filter(|t| t.generation == generation && t.running)?;
        timer.remaining = timer.remaining.saturating_sub(1);
        Some(timer.remaining)
    }

    /// 카운트다운 종료 처리. 세대가 바뀌었으면 None
    ///
    /// 태스크 핸들은 abort 없이 분리된다 (태스크 자신이 호출하므로).
    pub fn finish(&self, user: Identity, generation: u64) -> Option<Finished> {
        let mut timers = self.timers.lock();
        let timer = timers
            .get_mut(&user)
            .filter(|t| t.generation == generation && t.running)?;
        timer.handle = None;
        timer.running = false;
        timer.remaining = 0;
        let is_break = timer.is_break;
        timer.is_break = false;
        Some(Finished {
            is_break,
            session: timer.session.take(),
        })
    }

    /// 일시정지. 진행 중이 아니면 false
    pub fn pause(&self, user: Identity) -> bool {
        let mut timers = self.timers.lock();
        match timers.get_mut(&user) {
            Some(timer) if timer.running => {
                timer.invalidate();
                true
            }
            _ => false,
        }
    }

    /// 재개. 멈춘 카운트다운이 없으면 None, 있으면 `(세대, 휴식 여부)`
    pub fn resume(&self, user: Identity) -> Option<(u64, bool)> {
        let mut timers = self.timers.lock();
        let timer = timers
            .get_mut(&user)
            .filter(|t| !t.running && t.remaining > 0)?;
        timer.invalidate();
        timer.running = true;
        Some((timer.generation, timer.is_break))
    }

    /// 초기화: 카운트다운 중단, 진행 중 세션 폐기
    pub fn reset(&self, user: Identity) {
        let mut timers = self.timers.lock();
        if let Some(timer) = timers.get_mut(&user) {
            timer.invalidate();
            timer.session = None;
            timer.remaining = 0;
            timer.is_break = false;
        }
    }

    /// 현재 상태
    pub fn state(&self, user: Identity) -> TimerState {
        let timers = self.timers.lock();
        timers
            .get(&user)
            .map(|t| TimerState {
                remaining: t.remaining,
                is_break: t.is_break,
                running: t.running,
                has_session: t.session.is_some(),
            })
            .unwrap_or_default()
    }

    /// 모든 카운트다운 중단 (서버 종료)
    pub fn shutdown(&self) {
        let mut timers = self.timers.lock();
        for timer in timers.values_mut() {
            timer.invalidate();
        }
    }
}
