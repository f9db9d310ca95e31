//! 일일 챌린지 ("chaos chicken").
//!
//! 참가자마다 하루 하나씩 고정 목록에서 뽑는다. 상태: 제안됨 → 진행 중 → 종료.

use chicfocus_core::models::identity::Identity;
use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::error::ServiceError;

/// 챌린지 목록
pub const CHALLENGE_CATALOG: &[&str] = &[
    "Finish a Tier 2 chicken without pausing",
    "Start a chicken within 5 minutes of waking up",
    "Complete two different tasks back to back",
    "Do a Heavy Chicken with your phone in another room",
    "Write down three goals before your first chicken",
    "Take your break away from every screen",
    "Finish a chicken on the task you have been avoiding",
];

/// 챌린지 진행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    /// 제안됨
    Offered,
    /// 진행 중
    Started,
    /// 성공/실패로 종료
    Finished,
}

/// 참가자의 오늘 챌린지
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub description: String,
    pub state: ChallengeState,
}

/// 날짜별 챌린지 장부
#[derive(Debug, Default)]
pub struct ChallengeBook {
    day: Option<NaiveDate>,
    entries: BTreeMap<Identity, Challenge>,
}

impl ChallengeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 날짜가 바뀌었으면 참가자별 챌린지를 새로 뽑는다. 새로 뽑았으면 true
    pub fn roll_for<R: Rng + ?Sized>(&mut self, today: NaiveDate, rng: &mut R) -> bool {
        if self.day == Some(today) {
            return false;
        }
        self.day = Some(today);
        self.entries = Identity::ALL
            .iter()
            .filter_map(|user| {
                CHALLENGE_CATALOG.choose(rng).map(|description| {
                    (
                        *user,
                        Challenge {
                            description: (*description).to_string(),
                            state: ChallengeState::Offered,
                        },
                    )
                })
            })
            .collect();
        true
    }

    /// 참가자의 오늘 챌린지
    pub fn get(&self, user: Identity) -> Option<&Challenge> {
        self.entries.get(&user)
    }

    /// 아직 시작하지 않은 제안 목록
    pub fn offers(&self) -> Vec<(Identity, String)> {
        self.entries
            .iter()
            .filter(|(_, c)| c.state == ChallengeState::Offered)
            .map(|(user, c)| (*user, c.description.clone()))
            .collect()
    }

    /// 진행 중인 챌린지 목록
    pub fn in_progress(&self) -> Vec<(Identity, String)> {
        self.entries
            .iter()
            .filter(|(_, c)| c.state == ChallengeState::Started)
            .map(|(user, c)| (*user, c.description.clone()))
            .collect()
    }

    /// 챌린지 시작. 설명 반환
    pub fn start(&mut self, user: Identity) -> Result<String, ServiceError> {
        match self.entries.get_mut(&user) {
            Some(challenge) if challenge.state == ChallengeState::Offered => {
                challenge.state = ChallengeState::Started;
                Ok(challenge.description.clone())
            }
            _ => Err(ServiceError::ChallengeNotOffered(user)),
        }
    }

    /// 챌린지 종료
    pub fn complete(&mut self, user: Identity) -> Result<(), ServiceError> {
        match self.entries.get_mut(&user) {
            Some(challenge) if challenge.state == ChallengeState::Started => {
                challenge.state = ChallengeState::Finished;
                Ok(())
            }
            _ => Err(ServiceError::ChallengeNotStarted(user)),
        }
    }
}
