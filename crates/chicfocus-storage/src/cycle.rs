//! 사이클 데이터 모델.

use chicfocus_core::models::identity::Identity;
use chicfocus_core::models::scoreboard::{CycleWinner, ScoreboardSnapshot, UserSnapshot};
use chicfocus_core::models::session::FocusSession;
use chicfocus_core::scoring;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 참가자별 저장 레코드
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// 완료 세션 (시간순)
    #[serde(default)]
    pub sessions: Vec<FocusSession>,
    /// 챌린지 보너스 누적
    #[serde(default)]
    pub challenge_bonus: i64,
}

impl UserRecord {
    /// 세션 점수 + 챌린지 보너스
    pub fn total_points(&self) -> i64 {
        scoring::total_points(&self.sessions) + self.challenge_bonus
    }

    /// 오늘(로컬 날짜) 완료한 세션 수
    pub fn sessions_today(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.completed && s.is_today())
            .count()
    }
}

/// 저장 파일 전체 내용
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleData {
    /// 참가자별 레코드
    #[serde(default)]
    pub users: BTreeMap<Identity, UserRecord>,
    /// 현재 사이클 시작 시각
    pub cycle_start: DateTime<Utc>,
    /// 직전 사이클 승자
    #[serde(default)]
    pub winner: Option<CycleWinner>,
}

impl CycleData {
    /// `now`에 시작하는 빈 사이클
    pub fn fresh(now: DateTime<Utc>, winner: Option<CycleWinner>) -> Self {
        Self {
            users: Identity::ALL
                .iter()
                .map(|id| (*id, UserRecord::default()))
                .collect(),
            cycle_start: now,
            winner,
        }
    }

    /// 참가자 레코드 (없으면 빈 레코드)
    pub fn user(&self, identity: Identity) -> UserRecord {
        self.users.get(&identity).cloned().unwrap_or_default()
    }

    /// 참가자 레코드 (수정용, 없으면 생성)
    pub fn user_mut(&mut self, identity: Identity) -> &mut UserRecord {
        self.users.entry(identity).or_default()
    }

    /// 사이클 시작 후 경과한 전체 일수
    pub fn days_elapsed(&self, now: DateTime<Utc>) -> i64 {
        (now - self.cycle_start).num_days().max(0)
    }

    /// 남은 일수 (0 미만 없음)
    pub fn days_remaining(&self, length_days: i64, now: DateTime<Utc>) -> i64 {
        (length_days - self.days_elapsed(now)).max(0)
    }

    /// 사이클 기간이 끝났는지
    pub fn is_expired(&self, length_days: i64, now: DateTime<Utc>) -> bool {
        self.days_elapsed(now) >= length_days
    }

    /// 현재 점수 기준 승자
    pub fn leader(&self) -> CycleWinner {
        CycleWinner::decide(
            self.user(Identity::Luu).total_points(),
            self.user(Identity::Keni).total_points(),
        )
    }

    /// `full_update` 스냅샷
    pub fn to_snapshot(&self, length_days: i64, now: DateTime<Utc>) -> ScoreboardSnapshot {
        let users = Identity::ALL
            .iter()
            .map(|id| {
                let record = self.user(*id);
                let snapshot = UserSnapshot {
                    current_points: record.total_points(),
                    sessions_today: record.sessions_today(),
                    challenge_bonus: record.challenge_bonus,
                    sessions: record.sessions,
                };
                (*id, snapshot)
            })
            .collect();

        ScoreboardSnapshot {
            users,
            days_remaining: self.days_remaining(length_days, now),
            cycle_start: self.cycle_start,
            winner: self.winner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chicfocus_core::models::tier::Tier;
    use chrono::Duration;

    fn completed(task: &str, tier: Tier) -> FocusSession {
        let mut session = FocusSession::begin(task, tier);
        session.completed = true;
        session
    }

    #[test]
    fn fresh_cycle_has_both_users() {
        let data = CycleData::fresh(Utc::now(), None);
        assert_eq!(data.users.len(), 2);
        assert_eq!(data.user(Identity::Keni).total_points(), 0);
    }

    #[test]
    fn days_remaining_counts_whole_days() {
        let now = Utc::now();
        let data = CycleData::fresh(now - Duration::hours(49), None);
        assert_eq!(data.days_elapsed(now), 2);
        assert_eq!(data.days_remaining(7, now), 5);
        assert!(!data.is_expired(7, now));

        let old = CycleData::fresh(now - Duration::days(9), None);
        assert_eq!(old.days_remaining(7, now), 0);
        assert!(old.is_expired(7, now));
    }

    #[test]
    fn snapshot_includes_bonus_and_today_count() {
        let mut data = CycleData::fresh(Utc::now(), None);
        let luu = data.user_mut(Identity::Luu);
        luu.sessions.push(completed("essay", Tier::Medium));
        luu.challenge_bonus = 5;

        let snapshot = data.to_snapshot(7, Utc::now());
        let luu = &snapshot.users[&Identity::Luu];
        assert_eq!(luu.current_points, 7);
        assert_eq!(luu.sessions_today, 1);
        assert_eq!(snapshot.days_remaining, 7);
        assert_eq!(snapshot.users[&Identity::Keni].current_points, 0);
    }

    #[test]
    fn leader_by_total_points() {
        let mut data = CycleData::fresh(Utc::now(), None);
        assert_eq!(data.leader(), CycleWinner::Tie);

        data.user_mut(Identity::Keni)
            .sessions
            .push(completed("math", Tier::Light));
        assert_eq!(data.leader(), CycleWinner::User(Identity::Keni));
    }
}
