//! 집중 세션 서비스.
//!
//! 실시간 요청을 처리하고 결과를 브로드캐스트 채널로 내보낸다.
//! 요청 검증 실패는 [`ServiceError`]로 반환되어 요청한 연결에만 전달된다.

pub mod challenge;
pub mod timer;

use chicfocus_core::config::AppConfig;
use chicfocus_core::models::identity::Identity;
use chicfocus_core::models::protocol::{ClientEvent, ServerEvent};
use chicfocus_core::models::scoreboard::{CycleWinner, ScoreboardSnapshot};
use chicfocus_core::models::session::{format_clock, FocusSession};
use chicfocus_core::models::tier::Tier;
use chicfocus_storage::CycleStore;
use chrono::{Local, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use challenge::ChallengeBook;
use timer::{TimerRegistry, TimerState};

/// 실시간 이벤트 브로드캐스트 채널 용량
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 연결 확인 문구
pub const CONNECTED_STATUS: &str = "Connected to server";

/// 서비스 설정값
#[derive(Debug, Clone)]
struct ServiceSettings {
    tick: Duration,
    break_secs: u64,
    daily_limit: usize,
    session_secs_override: Option<u64>,
    cycle_length_days: i64,
    challenge_points: i64,
}

impl ServiceSettings {
    fn from_config(config: &AppConfig) -> Self {
        Self {
            tick: config.tick_interval(),
            break_secs: config.timer.break_secs,
            daily_limit: config.timer.daily_limit,
            session_secs_override: config.timer.session_secs_override,
            cycle_length_days: config.cycle.length_days,
            challenge_points: config.challenge.points,
        }
    }

    fn session_secs(&self, tier: Tier) -> u64 {
        self.session_secs_override.unwrap_or(tier.minutes() * 60)
    }
}

/// 집중 세션 서비스
pub struct FocusService {
    store: Arc<CycleStore>,
    settings: ServiceSettings,
    events: broadcast::Sender<ServerEvent>,
    timers: TimerRegistry,
    challenges: Mutex<ChallengeBook>,
}

impl FocusService {
    /// 새 서비스 생성
    pub fn new(store: Arc<CycleStore>, config: &AppConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            settings: ServiceSettings::from_config(config),
            events,
            timers: TimerRegistry::new(),
            challenges: Mutex::new(ChallengeBook::new()),
        }
    }

    /// 브로드캐스트 구독
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    /// 저장소
    pub fn store(&self) -> &CycleStore {
        &self.store
    }

    /// 참가자 타이머 상태
    pub fn timer_state(&self, user: Identity) -> TimerState {
        self.timers.state(user)
    }

    /// 현재 점수판
    pub fn snapshot(&self) -> ScoreboardSnapshot {
        self.store
            .data()
            .to_snapshot(self.settings.cycle_length_days, Utc::now())
    }

    /// 새 연결 처리. 새 연결에만 보낼 이벤트를 반환한다.
    ///
    /// 사이클이 만료됐으면 먼저 종료하고, 점수판을 브로드캐스트한다.
    /// 오늘 첫 연결이면 챌린지 제안을 브로드캐스트하고, 아니면 남은 제안을 새 연결에 다시 알린다.
    pub fn on_connect(&self) -> Result<Vec<ServerEvent>, ServiceError> {
        let now = Utc::now();
        if self
            .store
            .data()
            .is_expired(self.settings.cycle_length_days, now)
        {
            info!("사이클 만료, 자동 종료");
            self.end_cycle()?;
        }
        self.broadcast_full_update();

        let mut direct = vec![ServerEvent::ServerConnected {
            status: CONNECTED_STATUS.to_string(),
        }];

        let (rolled, offers, in_progress) = {
            let mut book = self.challenges.lock();
            let rolled = book.roll_for(Local::now().date_naive(), &mut rand::rng());
            (rolled, book.offers(), book.in_progress())
        };
        let offers = offers
            .into_iter()
            .map(|(user, description)| ServerEvent::ChaosChickenOffered { user, description });
        if rolled {
            debug!("오늘의 챌린지 추첨");
            for offer in offers {
                self.broadcast(offer);
            }
        } else {
            direct.extend(offers);
        }
        direct.extend(
            in_progress
                .into_iter()
                .map(|(user, description)| ServerEvent::ChaosChickenStarted { user, description }),
        );
        Ok(direct)
    }

    /// 클라이언트 요청 처리
    pub fn handle(self: &Arc<Self>, event: ClientEvent) -> Result<(), ServiceError> {
        debug!("요청 수신: {}", event.name());
        match event {
            ClientEvent::StartChicken {
                user,
                task_name,
                tier,
                current_user,
            } => {
                require_owner(user, current_user)?;
                self.start_chicken(user, &task_name, tier)
            }
            ClientEvent::PauseTimer { user, current_user } => {
                require_owner(user, current_user)?;
                self.pause_timer(user)
            }
            ClientEvent::ResumeTimer {
                user, current_user, ..
            } => {
                require_owner(user, current_user)?;
                self.resume_timer(user)
            }
            ClientEvent::ResetTimer { user, current_user } => {
                require_owner(user, current_user)?;
                self.reset_timer(user);
                Ok(())
            }
            ClientEvent::EndCycle => self.end_cycle().map(|_| ()),
            ClientEvent::StartChaosChicken { user, current_user } => {
                require_owner(user, current_user)?;
                self.start_challenge(user)
            }
            ClientEvent::CompleteChaosChicken {
                user,
                current_user,
                success,
            } => {
                require_owner(user, current_user)?;
                self.complete_challenge(user, success)
            }
        }
    }

    /// 세션 시작
    pub fn start_chicken(
        self: &Arc<Self>,
        user: Identity,
        task_name: &str,
        tier: Tier,
    ) -> Result<(), ServiceError> {
        let task_name = task_name.trim();
        if task_name.is_empty() {
            return Err(ServiceError::MissingTaskName);
        }
        if self.store.user(user).sessions_today() >= self.settings.daily_limit {
            return Err(ServiceError::DailyLimit(self.settings.daily_limit));
        }

        let duration = self.settings.session_secs(tier);
        let session = FocusSession::begin(task_name, tier);
        let generation = self.timers.begin(user, Some(session), duration, false);
        self.spawn_countdown(user, generation, false);

        info!("{user} 세션 시작: {task_name} ({tier}, {duration}초)");
        self.broadcast(ServerEvent::ChickenStarted {
            user,
            task_name: task_name.to_string(),
            tier,
            duration,
        });
        Ok(())
    }

    /// 일시정지
    pub fn pause_timer(&self, user: Identity) -> Result<(), ServiceError> {
        if !self.timers.pause(user) {
            return Err(ServiceError::NoRunningTimer(user));
        }
        self.broadcast(ServerEvent::TimerPaused { user });
        Ok(())
    }

    /// 재개
    pub fn resume_timer(self: &Arc<Self>, user: Identity) -> Result<(), ServiceError> {
        let (generation, is_break) = self
            .timers
            .resume(user)
            .ok_or(ServiceError::NoPausedTimer(user))?;
        self.spawn_countdown(user, generation, is_break);
        self.broadcast(ServerEvent::TimerResumed { user });
        Ok(())
    }

    /// 초기화: 진행 중 세션은 기록되지 않는다
    pub fn reset_timer(&self, user: Identity) {
        self.timers.reset(user);
        self.broadcast(ServerEvent::TimerReset { user });
    }

    /// 사이클 종료. 승자 반환
    pub fn end_cycle(&self) -> Result<CycleWinner, ServiceError> {
        let finished = self.store.reset_cycle(Utc::now())?;
        let winner = finished.leader();
        let luu_points = finished.user(Identity::Luu).total_points();
        let keni_points = finished.user(Identity::Keni).total_points();
        self.broadcast(ServerEvent::CycleComplete {
            winner,
            luu_points,
            keni_points,
        });
        self.broadcast_full_update();
        Ok(winner)
    }

    /// 챌린지 시작
    pub fn start_challenge(&self, user: Identity) -> Result<(), ServiceError> {
        let description = self.challenges.lock().start(user)?;
        self.broadcast(ServerEvent::ChaosChickenStarted { user, description });
        Ok(())
    }

    /// 챌린지 종료. 성공이면 보너스 점수 적립
    pub fn complete_challenge(&self, user: Identity, success: bool) -> Result<(), ServiceError> {
        self.challenges.lock().complete(user)?;
        let points_earned = if success {
            self.settings.challenge_points
        } else {
            0
        };
        if points_earned > 0 {
            self.store.add_challenge_bonus(user, points_earned)?;
        }
        info!("{user} 챌린지 종료: 성공={success}, +{points_earned}");
        self.broadcast(ServerEvent::ChaosChickenCompleted {
            user,
            success,
            points_earned,
        });
        self.broadcast_full_update();
        Ok(())
    }

    /// 모든 타이머 중단
    pub fn shutdown(&self) {
        self.timers.shutdown();
    }

    fn spawn_countdown(self: &Arc<Self>, user: Identity, generation: u64, is_break: bool) {
        let service = Arc::clone(self);
        let handle = tokio::spawn(async move {
            service.countdown(user, generation, is_break).await;
        });
        self.timers.attach(user, generation, handle);
    }

    async fn countdown(self: Arc<Self>, user: Identity, generation: u64, is_break: bool) {
        let mut ticker = tokio::time::interval(self.settings.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        while let Some(remaining) = self.timers.remaining(user, generation) {
            if remaining == 0 {
                self.on_countdown_finished(user, generation);
                return;
            }
            self.broadcast(ServerEvent::TimerUpdate {
                user,
                time: format_clock(remaining),
                remaining,
                is_break,
            });
            ticker.tick().await;
            if self.timers.tick(user, generation).is_none() {
                return;
            }
        }
    }

    fn on_countdown_finished(self: &Arc<Self>, user: Identity, generation: u64) {
        let Some(finished) = self.timers.finish(user, generation) else {
            return;
        };

        if finished.is_break {
            info!("{user} 휴식 종료");
            self.broadcast(ServerEvent::SessionComplete { user });
            return;
        }

        if let Some(session) = finished.session {
            if let Err(e) = self.store.record_session(user, session) {
                warn!("{user} 세션 저장 실패: {e}");
            }
        }
        info!("{user} 작업 타이머 완료, 휴식 시작");
        self.broadcast(ServerEvent::BreakStarted { user });
        self.broadcast_full_update();

        let generation = self
            .timers
            .begin(user, None, self.settings.break_secs, true);
        self.spawn_countdown(user, generation, true);
    }

    fn broadcast_full_update(&self) {
        self.broadcast(ServerEvent::FullUpdate(self.snapshot()));
    }

    fn broadcast(&self, event: ServerEvent) {
        let name = event.name();
        if self.events.send(event).is_err() {
            debug!("{name} 수신자 없음");
        }
    }
}

fn require_owner(user: Identity, current_user: Identity) -> Result<(), ServiceError> {
    if user != current_user {
        return Err(ServiceError::NotOwner { user, current_user });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chicfocus_core::models::session::ZERO_CLOCK;
    use tokio::sync::broadcast::Receiver;
    use tokio::time::timeout;

    fn fast_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.timer.tick_ms = 10;
        config.timer.session_secs_override = Some(2);
        config.timer.break_secs = 1;
        config
    }

    fn service(config: &AppConfig) -> Arc<FocusService> {
        Arc::new(FocusService::new(Arc::new(CycleStore::in_memory()), config))
    }

    async fn next_named(rx: &mut Receiver<ServerEvent>, name: &str) -> ServerEvent {
        timeout(Duration::from_secs(2), async {
            loop {
                match rx.recv().await {
                    Ok(event) if event.name() == name => return event,
                    Ok(_) => continue,
                    Err(e) => panic!("채널 에러: {e}"),
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("{name} 이벤트 대기 시간 초과"))
    }

    #[tokio::test]
    async fn work_then_break_then_complete() {
        let service = service(&fast_config());
        let mut rx = service.subscribe();

        service
            .start_chicken(Identity::Luu, "essay", Tier::Medium)
            .unwrap();

        match next_named(&mut rx, "chicken_started").await {
            ServerEvent::ChickenStarted { duration, .. } => assert_eq!(duration, 2),
            other => panic!("unexpected {other:?}"),
        }
        match next_named(&mut rx, "timer_update").await {
            ServerEvent::TimerUpdate { time, is_break, .. } => {
                assert_eq!(time, "00:02");
                assert!(!is_break);
            }
            other => panic!("unexpected {other:?}"),
        }
        next_named(&mut rx, "break_started").await;
        match next_named(&mut rx, "full_update").await {
            ServerEvent::FullUpdate(snapshot) => {
                let luu = &snapshot.users[&Identity::Luu];
                assert_eq!(luu.sessions.len(), 1);
                assert!(luu.sessions[0].completed);
                assert_eq!(luu.current_points, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        next_named(&mut rx, "session_complete").await;
        assert!(!service.timer_state(Identity::Luu).running);
    }

    #[tokio::test]
    async fn reset_discards_in_flight_session() {
        let mut config = fast_config();
        config.timer.session_secs_override = Some(60);
        let service = service(&config);
        let mut rx = service.subscribe();

        service
            .start_chicken(Identity::Keni, "reading", Tier::Light)
            .unwrap();
        next_named(&mut rx, "timer_update").await;
        service.reset_timer(Identity::Keni);
        next_named(&mut rx, "timer_reset").await;

        let state = service.timer_state(Identity::Keni);
        assert!(!state.running);
        assert!(!state.has_session);
        assert!(service.store().user(Identity::Keni).sessions.is_empty());
        assert_eq!(format_clock(state.remaining), ZERO_CLOCK);
    }

    #[tokio::test]
    async fn pause_and_resume_keep_remaining() {
        let mut config = fast_config();
        config.timer.session_secs_override = Some(60);
        let service = service(&config);
        let mut rx = service.subscribe();

        service
            .start_chicken(Identity::Luu, "code", Tier::Heavy)
            .unwrap();
        next_named(&mut rx, "timer_update").await;
        service.pause_timer(Identity::Luu).unwrap();
        next_named(&mut rx, "timer_paused").await;

        let paused = service.timer_state(Identity::Luu);
        assert!(!paused.running);
        assert!(paused.remaining > 0);
        assert!(matches!(
            service.pause_timer(Identity::Luu),
            Err(ServiceError::NoRunningTimer(Identity::Luu))
        ));

        service.resume_timer(Identity::Luu).unwrap();
        next_named(&mut rx, "timer_resumed").await;
        assert!(service.timer_state(Identity::Luu).running);
        assert!(service.resume_timer(Identity::Luu).is_err());
        service.shutdown();
    }

    #[tokio::test]
    async fn empty_task_and_foreign_user_are_rejected() {
        let service = service(&fast_config());

        assert!(matches!(
            service.start_chicken(Identity::Luu, "   ", Tier::Light),
            Err(ServiceError::MissingTaskName)
        ));
        let foreign = ClientEvent::PauseTimer {
            user: Identity::Keni,
            current_user: Identity::Luu,
        };
        assert!(matches!(
            service.handle(foreign),
            Err(ServiceError::NotOwner { .. })
        ));
    }

    #[tokio::test]
    async fn daily_limit_is_enforced() {
        let config = fast_config();
        let service = service(&config);
        for i in 0..config.timer.daily_limit {
            service
                .store()
                .record_session(
                    Identity::Luu,
                    FocusSession::begin(format!("task {i}"), Tier::Light),
                )
                .unwrap();
        }

        assert!(matches!(
            service.start_chicken(Identity::Luu, "one more", Tier::Light),
            Err(ServiceError::DailyLimit(5))
        ));
    }

    #[tokio::test]
    async fn end_cycle_picks_winner_and_resets() {
        let service = service(&fast_config());
        service
            .store()
            .record_session(Identity::Keni, FocusSession::begin("deep", Tier::Heavy))
            .unwrap();
        let mut rx = service.subscribe();

        let winner = service.end_cycle().unwrap();
        assert_eq!(winner, CycleWinner::User(Identity::Keni));

        match next_named(&mut rx, "cycle_complete").await {
            ServerEvent::CycleComplete {
                keni_points,
                luu_points,
                ..
            } => {
                assert_eq!(keni_points, 3);
                assert_eq!(luu_points, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
        match next_named(&mut rx, "full_update").await {
            ServerEvent::FullUpdate(snapshot) => {
                assert_eq!(snapshot.winner, Some(CycleWinner::User(Identity::Keni)));
                assert_eq!(snapshot.days_remaining, 7);
                assert!(snapshot.users.values().all(|u| u.sessions.is_empty()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn session_finished_by_timer_counts_toward_cycle_winner() {
        let mut config = fast_config();
        config.timer.session_secs_override = Some(1);
        let service = service(&config);
        let mut rx = service.subscribe();

        service
            .start_chicken(Identity::Luu, "essay", Tier::Light)
            .unwrap();
        next_named(&mut rx, "break_started").await;

        let winner = service.end_cycle().unwrap();
        assert_eq!(winner, CycleWinner::User(Identity::Luu));
        match next_named(&mut rx, "cycle_complete").await {
            ServerEvent::CycleComplete {
                winner, luu_points, ..
            } => {
                assert_eq!(winner, CycleWinner::User(Identity::Luu));
                assert_eq!(luu_points, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(service.store().user(Identity::Luu).sessions.is_empty());
    }

    #[tokio::test]
    async fn connect_offers_challenges_and_completion_awards_bonus() {
        let service = service(&fast_config());
        let mut rx = service.subscribe();

        let direct = service.on_connect().unwrap();
        assert!(matches!(direct[0], ServerEvent::ServerConnected { .. }));
        next_named(&mut rx, "full_update").await;
        next_named(&mut rx, "chaos_chicken_offered").await;

        let second = service.on_connect().unwrap();
        assert_eq!(second.len(), 1 + Identity::ALL.len());

        service.start_challenge(Identity::Luu).unwrap();
        service.complete_challenge(Identity::Luu, true).unwrap();
        match next_named(&mut rx, "chaos_chicken_completed").await {
            ServerEvent::ChaosChickenCompleted { points_earned, .. } => {
                assert_eq!(points_earned, 5)
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(service.store().user(Identity::Luu).challenge_bonus, 5);
        assert!(service.complete_challenge(Identity::Luu, true).is_err());
    }

    #[tokio::test]
    async fn reconnect_restores_started_challenge() {
        let service = service(&fast_config());
        service.on_connect().unwrap();
        service.start_challenge(Identity::Keni).unwrap();

        let direct = service.on_connect().unwrap();
        let started: Vec<_> = direct
            .iter()
            .filter_map(|event| match event {
                ServerEvent::ChaosChickenStarted { user, .. } => Some(*user),
                _ => None,
            })
            .collect();
        assert_eq!(started, vec![Identity::Keni]);
        assert!(direct.iter().all(|event| !matches!(
            event,
            ServerEvent::ChaosChickenOffered {
                user: Identity::Keni,
                ..
            }
        )));

        service.complete_challenge(Identity::Keni, false).unwrap();
        let direct = service.on_connect().unwrap();
        assert!(direct.iter().all(|event| event.name() != "chaos_chicken_started"));
    }
}
