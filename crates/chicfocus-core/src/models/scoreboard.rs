//! 점수판 / 사이클 스냅샷 모델.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::identity::Identity;
use super::session::{AttributedSession, FocusSession};

/// 사이클 승자 (참가자 또는 무승부)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleWinner {
    /// 단독 승자
    User(Identity),
    /// 동점
    Tie,
}

impl CycleWinner {
    /// 두 참가자 점수로 승자 결정
    pub fn decide(luu_points: i64, keni_points: i64) -> Self {
        match luu_points.cmp(&keni_points) {
            std::cmp::Ordering::Greater => CycleWinner::User(Identity::Luu),
            std::cmp::Ordering::Less => CycleWinner::User(Identity::Keni),
            std::cmp::Ordering::Equal => CycleWinner::Tie,
        }
    }
}

impl fmt::Display for CycleWinner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleWinner::User(identity) => f.write_str(identity.as_str()),
            CycleWinner::Tie => f.write_str("Tie"),
        }
    }
}

impl Serialize for CycleWinner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CycleWinner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "Tie" {
            return Ok(CycleWinner::Tie);
        }
        raw.parse::<Identity>()
            .map(CycleWinner::User)
            .map_err(serde::de::Error::custom)
    }
}

/// 참가자별 점수 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    /// 보너스/페널티 반영 총점
    pub current_points: i64,
    /// 오늘 세션 수
    pub sessions_today: usize,
    /// 사이클 내 완료 세션
    #[serde(default)]
    pub sessions: Vec<FocusSession>,
    /// 챌린지 보너스 점수
    #[serde(default)]
    pub challenge_bonus: i64,
}

/// `full_update` 페이로드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardSnapshot {
    /// 참가자별 스냅샷
    pub users: BTreeMap<Identity, UserSnapshot>,
    /// 사이클 남은 일수
    pub days_remaining: i64,
    /// 사이클 시작 시각
    pub cycle_start: DateTime<Utc>,
    /// 직전 사이클 승자
    #[serde(default)]
    pub winner: Option<CycleWinner>,
}

impl ScoreboardSnapshot {
    /// 모든 참가자의 세션을 최근순으로 정렬해 최대 `limit`개 반환
    pub fn recent_sessions(&self, limit: usize) -> Vec<AttributedSession> {
        let mut all: Vec<AttributedSession> = self
            .users
            .iter()
            .flat_map(|(user, snapshot)| {
                snapshot.sessions.iter().map(move |session| AttributedSession {
                    user: *user,
                    session: session.clone(),
                })
            })
            .collect();

        all.sort_by(|a, b| b.session.timestamp.cmp(&a.session.timestamp));
        all.truncate(limit);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tier::Tier;
    use chrono::Duration;

    fn session_at(task: &str, minutes_ago: i64) -> FocusSession {
        FocusSession {
            task_name: task.to_string(),
            tier: Tier::Light,
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            completed: true,
        }
    }

    #[test]
    fn winner_decision() {
        assert_eq!(CycleWinner::decide(5, 3), CycleWinner::User(Identity::Luu));
        assert_eq!(CycleWinner::decide(1, 3), CycleWinner::User(Identity::Keni));
        assert_eq!(CycleWinner::decide(2, 2), CycleWinner::Tie);
    }

    #[test]
    fn winner_wire_format() {
        assert_eq!(serde_json::to_string(&CycleWinner::Tie).unwrap(), "\"Tie\"");
        let winner: CycleWinner = serde_json::from_str("\"4keni\"").unwrap();
        assert_eq!(winner, CycleWinner::User(Identity::Keni));
    }

    #[test]
    fn recent_sessions_merges_and_limits() {
        let mut users = BTreeMap::new();
        users.insert(
            Identity::Luu,
            UserSnapshot {
                current_points: 0,
                sessions_today: 0,
                sessions: (0..8).map(|i| session_at("luu", i * 10)).collect(),
                challenge_bonus: 0,
            },
        );
        users.insert(
            Identity::Keni,
            UserSnapshot {
                current_points: 0,
                sessions_today: 0,
                sessions: (0..8).map(|i| session_at("keni", i * 10 + 5)).collect(),
                challenge_bonus: 0,
            },
        );
        let snapshot = ScoreboardSnapshot {
            users,
            days_remaining: 7,
            cycle_start: Utc::now(),
            winner: None,
        };

        let recent = snapshot.recent_sessions(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].user, Identity::Luu);
        assert_eq!(recent[1].user, Identity::Keni);
        for pair in recent.windows(2) {
            assert!(pair[0].session.timestamp >= pair[1].session.timestamp);
        }
    }
}
